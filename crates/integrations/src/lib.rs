//! Printpost metrics API integration: HTTP client, response cache, and the
//! report service that feeds fetched datasets to the aggregators.

#![warn(clippy::unwrap_used)]

pub mod fetch_cache;
pub mod printpost;
pub mod reports;

pub use fetch_cache::FetchCache;
pub use printpost::{MetricsSource, PrintpostClient};
pub use reports::{ChannelReport, ReportService};
