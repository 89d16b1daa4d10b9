//! Report service: fetches the inputs each dashboard needs and runs the
//! aggregators over them.
//!
//! A failed fetch is logged and treated as "no data" so reports always
//! render; callers cannot tell an upstream failure from an empty period.

use crate::fetch_cache::FetchCache;
use crate::printpost::MetricsSource;
use campaign_core::config::{EmptyMonthPolicy, ReportingConfig, StatusColorMode};
use campaign_core::{DatasetQuery, DeliveryChannel, RequestDatasetEntry, RequestsSummary};
use campaign_reporting::{
    aggregate_by_channel, aggregate_by_month, overall_totals, ChannelAggregate, ChannelTotals,
    MonthBucket, MonthlyAggregate,
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MAX_CACHED_QUERIES: usize = 10_000;

/// Per-channel view of one query.
#[derive(Debug, Clone)]
pub struct ChannelReport {
    pub channels: Vec<ChannelAggregate>,
    pub totals: ChannelTotals,
}

pub struct ReportService {
    source: Arc<dyn MetricsSource>,
    datasets: FetchCache<Vec<RequestDatasetEntry>>,
    summaries: FetchCache<RequestsSummary>,
    status_colors: StatusColorMode,
    empty_months: EmptyMonthPolicy,
}

impl ReportService {
    pub fn new(source: Arc<dyn MetricsSource>, cache_ttl: Duration, config: &ReportingConfig) -> Self {
        Self {
            source,
            datasets: FetchCache::new(cache_ttl, MAX_CACHED_QUERIES),
            summaries: FetchCache::new(cache_ttl, MAX_CACHED_QUERIES),
            status_colors: config.status_colors,
            empty_months: config.empty_months,
        }
    }

    /// Aggregate the query's datasets for each channel in `channels`.
    pub async fn channel_report(
        &self,
        token: &str,
        query: &DatasetQuery,
        channels: &[DeliveryChannel],
    ) -> ChannelReport {
        let entries = self.datasets(token, query).await;
        let aggregates = aggregate_by_channel(&entries, channels, self.status_colors);
        let totals = overall_totals(&aggregates);
        metrics::counter!("reports.channel").increment(1);

        ChannelReport {
            channels: aggregates.into_values().collect(),
            totals,
        }
    }

    /// One fetch per calendar month of the query range, then a monthly rollup.
    pub async fn monthly_report(&self, token: &str, query: &DatasetQuery) -> Vec<MonthlyAggregate> {
        let months = query.range.months();
        let fetches = months.iter().map(|month| {
            let month_query = query.for_range(month.range);
            async move { self.datasets(token, &month_query).await }
        });
        let results = join_all(fetches).await;

        let buckets: Vec<MonthBucket> = months
            .into_iter()
            .zip(results)
            .map(|(month, entries)| MonthBucket {
                key: month.key,
                label: month.label,
                entries,
            })
            .collect();

        let report = aggregate_by_month(&buckets, self.empty_months);
        metrics::counter!("reports.monthly").increment(1);
        info!(
            months = buckets.len(),
            with_data = report.iter().filter(|m| m.has_data).count(),
            "Monthly report computed"
        );
        report
    }

    /// Request counts per stage; zeroed when the fetch fails.
    pub async fn requests_summary(&self, token: &str, query: &DatasetQuery) -> RequestsSummary {
        let key = cache_key("requests", token, query);
        if let Some(hit) = self.summaries.get(&key) {
            return hit;
        }
        match self.source.fetch_requests_summary(token, query).await {
            Ok(summary) => {
                self.summaries.put(key, summary);
                summary
            }
            Err(e) => {
                warn!(error = %e, "Requests summary fetch failed, reporting no data");
                metrics::counter!("reports.fetch_failures").increment(1);
                RequestsSummary::default()
            }
        }
    }

    /// Drop expired cache entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.datasets.purge_expired() + self.summaries.purge_expired()
    }

    async fn datasets(&self, token: &str, query: &DatasetQuery) -> Vec<RequestDatasetEntry> {
        let key = cache_key("datasets", token, query);
        if let Some(hit) = self.datasets.get(&key) {
            return hit;
        }
        match self.source.fetch_request_datasets(token, query).await {
            Ok(entries) => {
                self.datasets.put(key, entries.clone());
                entries
            }
            Err(e) => {
                warn!(
                    error = %e,
                    from = %query.range.start(),
                    to = %query.range.end(),
                    "Dataset fetch failed, reporting no data"
                );
                metrics::counter!("reports.fetch_failures").increment(1);
                Vec::new()
            }
        }
    }
}

fn cache_key(endpoint: &str, token: &str, query: &DatasetQuery) -> String {
    format!(
        "{endpoint}|{token}|{}|{}|{}|{}",
        query.range.start(),
        query.range.end(),
        query.cost_center_id.as_deref().unwrap_or(""),
        query.campaign_id.as_deref().unwrap_or(""),
    )
}
