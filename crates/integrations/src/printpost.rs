//! Printpost metrics API client.
//!
//! Only the two dashboard endpoints the reports need are wrapped. Both take
//! the same filters: a `from`/`to` pair rendered with the configured fixed
//! offset plus optional `costCenterId` and `campaignId`.

use async_trait::async_trait;
use campaign_core::config::PrintpostConfig;
use campaign_core::{CampaignError, CampaignResult, DatasetQuery, RequestDatasetEntry, RequestsSummary};
use chrono::FixedOffset;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DATASETS_PATH: &str = "/dashboard/request-datasets";
const REQUESTS_PATH: &str = "/dashboard/requests";

/// Source of raw delivery metrics.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Per-bucket delivery datasets for the query range.
    async fn fetch_request_datasets(
        &self,
        token: &str,
        query: &DatasetQuery,
    ) -> CampaignResult<Vec<RequestDatasetEntry>>;

    /// Request counts per workflow stage for the query range.
    async fn fetch_requests_summary(
        &self,
        token: &str,
        query: &DatasetQuery,
    ) -> CampaignResult<RequestsSummary>;
}

fn http_err(e: reqwest::Error) -> CampaignError {
    CampaignError::Http(e.to_string())
}

/// HTTP client for the Printpost dashboard endpoints.
pub struct PrintpostClient {
    http: reqwest::Client,
    base_url: String,
    offset: FixedOffset,
}

impl PrintpostClient {
    pub fn new(config: &PrintpostConfig) -> CampaignResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| CampaignError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            offset: config.utc_offset()?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        query: &DatasetQuery,
    ) -> CampaignResult<T> {
        let params = query.to_params(self.offset);
        debug!(path, ?params, "Querying metrics API");

        let resp = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            metrics::counter!("printpost.errors", "status" => status.as_u16().to_string())
                .increment(1);
            return Err(CampaignError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(http_err)?;
        metrics::counter!("printpost.requests").increment(1);
        Ok(serde_json::from_str(&body)?)
    }
}

/// Endpoints have answered both bare and `{"data": ...}`-wrapped payloads.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

#[async_trait]
impl MetricsSource for PrintpostClient {
    async fn fetch_request_datasets(
        &self,
        token: &str,
        query: &DatasetQuery,
    ) -> CampaignResult<Vec<RequestDatasetEntry>> {
        let envelope: Envelope<Vec<RequestDatasetEntry>> =
            self.get(DATASETS_PATH, token, query).await?;
        Ok(envelope.into_inner())
    }

    async fn fetch_requests_summary(
        &self,
        token: &str,
        query: &DatasetQuery,
    ) -> CampaignResult<RequestsSummary> {
        let envelope: Envelope<RequestsSummary> = self.get(REQUESTS_PATH, token, query).await?;
        Ok(envelope.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::DeliveryChannel;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = PrintpostClient::new(&PrintpostConfig {
            base_url: "https://metrics.example.com/api/".to_string(),
            ..PrintpostConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(DATASETS_PATH),
            "https://metrics.example.com/api/dashboard/request-datasets"
        );
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let result = PrintpostClient::new(&PrintpostConfig {
            utc_offset_secs: -90_000,
            ..PrintpostConfig::default()
        });
        assert!(matches!(result, Err(CampaignError::Config(_))));
    }

    #[test]
    fn test_bare_dataset_payload() {
        let body = r#"[{"emailAll": 10, "emailReceive": 9}, {"smsAll": 3}]"#;
        let entries = serde_json::from_str::<Envelope<Vec<RequestDatasetEntry>>>(body)
            .unwrap()
            .into_inner();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].delivered(DeliveryChannel::Email), 9);
    }

    #[test]
    fn test_wrapped_dataset_payload() {
        let body = r#"{"data": [{"cartaAll": 4}]}"#;
        let entries = serde_json::from_str::<Envelope<Vec<RequestDatasetEntry>>>(body)
            .unwrap()
            .into_inner();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sent(DeliveryChannel::Carta), 4);
    }

    #[test]
    fn test_summary_payloads() {
        let bare = r#"{"analise": {"total": 1}, "cancelados": {"total": 2}}"#;
        let wrapped = r#"{"data": {"execucao": {"total": 5}}}"#;
        let a = serde_json::from_str::<Envelope<RequestsSummary>>(bare)
            .unwrap()
            .into_inner();
        let b = serde_json::from_str::<Envelope<RequestsSummary>>(wrapped)
            .unwrap()
            .into_inner();
        assert_eq!(a.total(), 3);
        assert_eq!(b.execucao.total, 5);
    }

    #[test]
    fn test_malformed_element_keeps_rest_of_payload() {
        let body = r#"[{"emailAll": 5}, null, 7]"#;
        let entries = serde_json::from_str::<Envelope<Vec<RequestDatasetEntry>>>(body)
            .unwrap()
            .into_inner();
        assert_eq!(entries.len(), 3);
        let sent: u64 = entries.iter().map(|e| e.sent(DeliveryChannel::Email)).sum();
        assert_eq!(sent, 5);
    }
}
