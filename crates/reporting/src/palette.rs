//! Chart colors for status slices.

use campaign_core::config::StatusColorMode;

/// Fixed chart palette, cycled when there are more slices than colors.
pub const STATUS_PALETTE: [&str; 8] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D", "#FFC658", "#FF7C7C",
];

/// Color for the slice at `position`.
pub fn color_at(position: usize) -> &'static str {
    STATUS_PALETTE[position % STATUS_PALETTE.len()]
}

/// One color per label, in the order the labels were given.
///
/// `Positional` uses each label's index, so reordering the input reorders
/// colors. `StableByLabel` uses the label's rank in the sorted label set, so
/// a label keeps its color regardless of where it appears.
pub fn assign_colors(labels: &[&str], mode: StatusColorMode) -> Vec<&'static str> {
    match mode {
        StatusColorMode::Positional => (0..labels.len()).map(color_at).collect(),
        StatusColorMode::StableByLabel => {
            let mut sorted: Vec<&str> = labels.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            labels
                .iter()
                .map(|label| color_at(sorted.binary_search(label).unwrap_or(0)))
                .collect()
        }
    }
}
