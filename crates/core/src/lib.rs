pub mod channels;
pub mod config;
pub mod error;
pub mod period;
pub mod types;

pub use channels::{ChannelMetric, DeliveryChannel};
pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use period::{DatasetQuery, DateRange, MonthSpan};
pub use types::{RequestDatasetEntry, RequestsSummary, StatusItem};
