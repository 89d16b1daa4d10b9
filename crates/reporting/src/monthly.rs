//! Per-month rollups for the delivery trend chart.

use crate::rate::delivery_rate;
use campaign_core::config::EmptyMonthPolicy;
use campaign_core::{DeliveryChannel, RequestDatasetEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

/// Entries fetched for one calendar month.
#[derive(Debug, Clone, Default)]
pub struct MonthBucket {
    /// `YYYY-MM`.
    pub key: String,
    pub label: String,
    pub entries: Vec<RequestDatasetEntry>,
}

/// Totals for one month across every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyAggregate {
    pub key: String,
    pub label: String,
    pub total_sent: u64,
    pub delivered: u64,
    pub failed: u64,
    /// Percentage, not rounded.
    pub delivery_rate: f64,
    /// False only for months kept by `EmptyMonthPolicy::Keep`.
    pub has_data: bool,
}

/// One aggregate per bucket, in bucket order.
///
/// A bucket that sent nothing on any channel is treated as "no data": it is
/// dropped under `EmptyMonthPolicy::Drop` and flagged `has_data = false`
/// under `Keep`.
pub fn aggregate_by_month(buckets: &[MonthBucket], policy: EmptyMonthPolicy) -> Vec<MonthlyAggregate> {
    buckets
        .iter()
        .filter_map(|bucket| {
            let agg = aggregate_bucket(bucket);
            if agg.has_data || policy == EmptyMonthPolicy::Keep {
                Some(agg)
            } else {
                debug!(month = %bucket.key, "Dropping month without sends");
                None
            }
        })
        .collect()
}

fn aggregate_bucket(bucket: &MonthBucket) -> MonthlyAggregate {
    let (mut sent, mut delivered, mut failed) = (0u64, 0u64, 0u64);
    for entry in &bucket.entries {
        for channel in DeliveryChannel::ALL {
            sent = sent.saturating_add(entry.sent(channel));
            delivered = delivered.saturating_add(entry.delivered(channel));
            failed = failed.saturating_add(entry.not_delivered(channel));
        }
    }

    MonthlyAggregate {
        key: bucket.key.clone(),
        label: bucket.label.clone(),
        total_sent: sent,
        delivered,
        failed,
        delivery_rate: delivery_rate(delivered, sent),
        has_data: sent > 0,
    }
}
