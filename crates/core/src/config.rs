use crate::error::{CampaignError, CampaignResult};
use crate::period::DEFAULT_UTC_OFFSET_SECS;
use chrono::FixedOffset;
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_DASHBOARD__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub printpost: PrintpostConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Connection settings for the Printpost metrics API.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintpostConfig {
    #[serde(default = "default_printpost_url")]
    pub base_url: String,
    /// Service token used when a caller does not forward its own.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Offset rendered on every `from`/`to` timestamp.
    #[serde(default = "default_utc_offset_secs")]
    pub utc_offset_secs: i32,
    /// Lifetime of cached fetch results. Zero disables the cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

/// How status slices are mapped onto the chart palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColorMode {
    /// Palette slot follows iteration order.
    #[default]
    Positional,
    /// Palette slot follows the label's rank in the sorted label set.
    StableByLabel,
}

/// What the monthly report does with months that sent nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyMonthPolicy {
    #[default]
    Drop,
    Keep,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default)]
    pub status_colors: StatusColorMode,
    #[serde(default)]
    pub empty_months: EmptyMonthPolicy,
    /// Longest range a single report may cover.
    #[serde(default = "default_max_range_days")]
    pub max_range_days: i64,
}

// Default functions
fn default_node_id() -> String {
    "dashboard-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_printpost_url() -> String {
    "https://api.printpost.com.br/api/v1".to_string()
}
fn default_request_timeout_ms() -> u64 {
    15_000
}
fn default_utc_offset_secs() -> i32 {
    DEFAULT_UTC_OFFSET_SECS
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_max_range_days() -> i64 {
    366
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for PrintpostConfig {
    fn default() -> Self {
        Self {
            base_url: default_printpost_url(),
            token: None,
            request_timeout_ms: default_request_timeout_ms(),
            utc_offset_secs: default_utc_offset_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl PrintpostConfig {
    pub fn utc_offset(&self) -> CampaignResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs).ok_or_else(|| {
            CampaignError::Config(format!("invalid utc offset: {}s", self.utc_offset_secs))
        })
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            status_colors: StatusColorMode::default(),
            empty_months: EmptyMonthPolicy::default(),
            max_range_days: default_max_range_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            printpost: PrintpostConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
