/// Delivered share of sent, as a percentage. Zero when nothing was sent.
pub fn delivery_rate(delivered: u64, sent: u64) -> f64 {
    if sent == 0 {
        return 0.0;
    }
    delivered as f64 * 100.0 / sent as f64
}

/// One-decimal display form, e.g. `90.0`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}
