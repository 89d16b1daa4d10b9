//! Delivery reporting: per-channel and per-month rollups of the datasets
//! returned by the Printpost metrics API.
//!
//! Everything here is a pure fold over borrowed entries: no I/O, no shared
//! state, no errors. Missing or malformed counters count as zero.

pub mod channel;
pub mod monthly;
pub mod palette;
pub mod rate;

pub use channel::{aggregate_by_channel, overall_totals, ChannelAggregate, ChannelTotals, StatusSlice};
pub use monthly::{aggregate_by_month, MonthBucket, MonthlyAggregate};
pub use rate::{delivery_rate, format_rate};
