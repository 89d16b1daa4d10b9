//! Per-channel rollups over a set of dataset entries.

use crate::palette::assign_colors;
use crate::rate::delivery_rate;
use campaign_core::config::StatusColorMode;
use campaign_core::{DeliveryChannel, RequestDatasetEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

/// One status label with its summed quantity and chart color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusSlice {
    pub label: String,
    pub quantity: u64,
    pub color: String,
}

/// Totals for one channel across all entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelAggregate {
    pub channel: DeliveryChannel,
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_not_delivered: u64,
    /// Percentage of sent that was delivered. Not rounded.
    pub delivery_rate: f64,
    pub status_breakdown: Vec<StatusSlice>,
}

impl ChannelAggregate {
    fn empty(channel: DeliveryChannel) -> Self {
        Self {
            channel,
            total_sent: 0,
            total_delivered: 0,
            total_not_delivered: 0,
            delivery_rate: 0.0,
            status_breakdown: Vec::new(),
        }
    }

    pub fn has_activity(&self) -> bool {
        self.total_sent > 0 || !self.status_breakdown.is_empty()
    }
}

/// Status quantities keyed by label, in first-seen order.
#[derive(Debug, Default)]
struct StatusTally {
    order: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl StatusTally {
    fn add(&mut self, label: String, quantity: u64) {
        match self.index.get(&label) {
            Some(&i) => self.order[i].1 = self.order[i].1.saturating_add(quantity),
            None => {
                self.index.insert(label.clone(), self.order.len());
                self.order.push((label, quantity));
            }
        }
    }

    fn into_slices(self, mode: StatusColorMode) -> Vec<StatusSlice> {
        let labels: Vec<&str> = self.order.iter().map(|(l, _)| l.as_str()).collect();
        let colors = assign_colors(&labels, mode);
        self.order
            .iter()
            .zip(colors)
            .map(|((label, quantity), color)| StatusSlice {
                label: label.clone(),
                quantity: *quantity,
                color: color.to_string(),
            })
            .collect()
    }
}

/// Fold `entries` into one aggregate per channel in `channels`.
///
/// Every requested channel is present in the result, zeroed when no entry
/// mentions it. Duplicate channels are folded once.
pub fn aggregate_by_channel(
    entries: &[RequestDatasetEntry],
    channels: &[DeliveryChannel],
    colors: StatusColorMode,
) -> BTreeMap<DeliveryChannel, ChannelAggregate> {
    let mut result = BTreeMap::new();
    for &channel in channels {
        if result.contains_key(&channel) {
            continue;
        }
        result.insert(channel, aggregate_channel(entries, channel, colors));
    }
    result
}

fn aggregate_channel(
    entries: &[RequestDatasetEntry],
    channel: DeliveryChannel,
    colors: StatusColorMode,
) -> ChannelAggregate {
    let mut agg = ChannelAggregate::empty(channel);
    let mut tally = StatusTally::default();

    for entry in entries {
        agg.total_sent = agg.total_sent.saturating_add(entry.sent(channel));
        agg.total_delivered = agg.total_delivered.saturating_add(entry.delivered(channel));
        agg.total_not_delivered = agg
            .total_not_delivered
            .saturating_add(entry.not_delivered(channel));

        for (i, item) in entry.statuses(channel).into_iter().enumerate() {
            let label = item.label.unwrap_or_else(|| format!("Status {}", i + 1));
            tally.add(label, item.quantity);
        }
    }

    agg.delivery_rate = delivery_rate(agg.total_delivered, agg.total_sent);
    agg.status_breakdown = tally.into_slices(colors);
    agg
}

/// Sums across every channel of an aggregate map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelTotals {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_not_delivered: u64,
    pub delivery_rate: f64,
}

pub fn overall_totals(aggregates: &BTreeMap<DeliveryChannel, ChannelAggregate>) -> ChannelTotals {
    let mut totals = aggregates
        .values()
        .fold(ChannelTotals::default(), |mut acc, agg| {
            acc.total_sent = acc.total_sent.saturating_add(agg.total_sent);
            acc.total_delivered = acc.total_delivered.saturating_add(agg.total_delivered);
            acc.total_not_delivered = acc
                .total_not_delivered
                .saturating_add(agg.total_not_delivered);
            acc
        });
    totals.delivery_rate = delivery_rate(totals.total_delivered, totals.total_sent);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::STATUS_PALETTE;
    use serde_json::{json, Value};

    fn entries(values: Vec<Value>) -> Vec<RequestDatasetEntry> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn email(entries: &[RequestDatasetEntry]) -> ChannelAggregate {
        aggregate_by_channel(entries, &[DeliveryChannel::Email], StatusColorMode::Positional)
            .remove(&DeliveryChannel::Email)
            .unwrap()
    }

    #[test]
    fn test_single_email_entry() {
        let input = entries(vec![json!({"emailAll": 100, "emailReceive": 90, "emailNotReceive": 5})]);
        let agg = email(&input);
        assert_eq!(agg.total_sent, 100);
        assert_eq!(agg.total_delivered, 90);
        assert_eq!(agg.total_not_delivered, 5);
        assert_eq!(agg.delivery_rate, 90.0);
    }

    #[test]
    fn test_zero_sent_has_zero_rate() {
        let input = entries(vec![json!({"emailAll": 0})]);
        let agg = email(&input);
        assert_eq!(agg.total_sent, 0);
        assert_eq!(agg.total_delivered, 0);
        assert_eq!(agg.total_not_delivered, 0);
        assert_eq!(agg.delivery_rate, 0.0);
    }

    #[test]
    fn test_empty_input_yields_zeroed_channels() {
        let result = aggregate_by_channel(&[], &DeliveryChannel::ALL, StatusColorMode::Positional);
        assert_eq!(result.len(), 5);
        for agg in result.values() {
            assert_eq!(agg.total_sent, 0);
            assert_eq!(agg.delivery_rate, 0.0);
            assert!(agg.status_breakdown.is_empty());
            assert!(!agg.has_activity());
        }
    }

    #[test]
    fn test_rate_is_not_rounded() {
        let input = entries(vec![json!({"smsAll": 3, "smsReceived": 1})]);
        let result = aggregate_by_channel(&input, &[DeliveryChannel::Sms], StatusColorMode::Positional);
        let agg = &result[&DeliveryChannel::Sms];
        assert_eq!(agg.delivery_rate, 100.0 / 3.0);
    }

    #[test]
    fn test_sums_across_entries_in_any_order() {
        let mut input = entries(vec![
            json!({"whatsappAll": 10, "whatsappReceive": 8}),
            json!({"whatsappAll": "30", "whatsappReceived": 20, "whatsappNotReceive": 4}),
            json!({"emailAll": 50}),
            json!({"whatsappAll": null, "whatsappReceive": "x"}),
        ]);
        let forward = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::Positional);
        input.reverse();
        let backward = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::Positional);

        let wa = &forward[&DeliveryChannel::Whatsapp];
        assert_eq!(wa.total_sent, 40);
        assert_eq!(wa.total_delivered, 28);
        assert_eq!(wa.total_not_delivered, 4);
        assert_eq!(wa.total_sent, backward[&DeliveryChannel::Whatsapp].total_sent);
        assert_eq!(forward[&DeliveryChannel::Email].total_sent, 50);
        assert_eq!(forward[&DeliveryChannel::Carta].total_sent, 0);
    }

    #[test]
    fn test_status_breakdown_two_items() {
        let input = entries(vec![json!({
            "email": [
                {"description": "Entregue", "quantity": 80},
                {"description": "Falhou", "quantity": 20}
            ]
        })]);
        let agg = email(&input);
        assert_eq!(agg.status_breakdown.len(), 2);
        let total: u64 = agg.status_breakdown.iter().map(|s| s.quantity).sum();
        assert_eq!(total, 100);
        assert_eq!(agg.status_breakdown[0].label, "Entregue");
        assert_eq!(agg.status_breakdown[0].color, STATUS_PALETTE[0]);
        assert_eq!(agg.status_breakdown[1].color, STATUS_PALETTE[1]);
    }

    #[test]
    fn test_status_labels_merge_and_fall_back() {
        let input = entries(vec![
            json!({"carta": [{"description": "Postado", "quantity": 5}, {"quantity": 2}]}),
            json!({"carta": [{"label": "Postado", "value": 7}, {"quantity": 1}, {"quantity": 4}]}),
        ]);
        let result = aggregate_by_channel(&input, &[DeliveryChannel::Carta], StatusColorMode::Positional);
        let slices = &result[&DeliveryChannel::Carta].status_breakdown;
        let summary: Vec<(&str, u64)> = slices.iter().map(|s| (s.label.as_str(), s.quantity)).collect();
        assert_eq!(summary, vec![("Postado", 12), ("Status 2", 3), ("Status 3", 4)]);
    }

    #[test]
    fn test_input_is_untouched_and_result_repeatable() {
        let input = entries(vec![json!({
            "rcsAll": 9, "rcsReceive": 3,
            "rcs": [{"description": "Lido", "quantity": 3}]
        })]);
        let snapshot = input.clone();
        let first = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::StableByLabel);
        let second = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::StableByLabel);
        assert_eq!(input, snapshot);
        assert_eq!(first, second);
        assert_eq!(
            first[&DeliveryChannel::Rcs].delivery_rate.to_bits(),
            second[&DeliveryChannel::Rcs].delivery_rate.to_bits()
        );
    }

    #[test]
    fn test_duplicate_channels_folded_once() {
        let input = entries(vec![json!({"smsAll": 4})]);
        let result = aggregate_by_channel(
            &input,
            &[DeliveryChannel::Sms, DeliveryChannel::Sms],
            StatusColorMode::Positional,
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[&DeliveryChannel::Sms].total_sent, 4);
    }

    #[test]
    fn test_overall_totals() {
        let input = entries(vec![json!({
            "emailAll": 100, "emailReceive": 90,
            "smsAll": 100, "smsReceive": 50, "smsNotReceive": 50
        })]);
        let result = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::Positional);
        let totals = overall_totals(&result);
        assert_eq!(totals.total_sent, 200);
        assert_eq!(totals.total_delivered, 140);
        assert_eq!(totals.total_not_delivered, 50);
        assert_eq!(totals.delivery_rate, 70.0);
    }

    #[test]
    fn test_overall_totals_saturate() {
        let input = entries(vec![json!({
            "emailAll": 1e20, "emailReceive": 1e20,
            "smsAll": 1e20, "smsReceive": 1e20
        })]);
        let result = aggregate_by_channel(&input, &DeliveryChannel::ALL, StatusColorMode::Positional);
        assert_eq!(result[&DeliveryChannel::Email].total_sent, u64::MAX);
        let totals = overall_totals(&result);
        assert_eq!(totals.total_sent, u64::MAX);
        assert_eq!(totals.total_delivered, u64::MAX);
        assert_eq!(totals.delivery_rate, 100.0);
    }
}
