//! Delivery report endpoints.
//!
//! Rates are returned both as raw percentages and as one-decimal labels;
//! this is the only place rates are turned into strings.

use crate::rest::{AppState, ErrorResponse};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use campaign_core::{DatasetQuery, DateRange, DeliveryChannel, RequestsSummary};
use campaign_reporting::{format_rate, ChannelAggregate, MonthlyAggregate, StatusSlice};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Filters shared by every report endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// First day of the range (inclusive), `YYYY-MM-DD`.
    pub from: NaiveDate,
    /// Last day of the range (inclusive), `YYYY-MM-DD`.
    pub to: NaiveDate,
    pub cost_center_id: Option<String>,
    pub campaign_id: Option<String>,
    /// Comma-separated channel keys; defaults to every channel.
    pub channels: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelView {
    pub channel: DeliveryChannel,
    pub display_name: String,
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_not_delivered: u64,
    pub delivery_rate: f64,
    pub delivery_rate_label: String,
    pub status_breakdown: Vec<StatusSlice>,
}

impl From<ChannelAggregate> for ChannelView {
    fn from(agg: ChannelAggregate) -> Self {
        Self {
            channel: agg.channel,
            display_name: agg.channel.display_name().to_string(),
            total_sent: agg.total_sent,
            total_delivered: agg.total_delivered,
            total_not_delivered: agg.total_not_delivered,
            delivery_rate: agg.delivery_rate,
            delivery_rate_label: format_rate(agg.delivery_rate),
            status_breakdown: agg.status_breakdown,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelReportResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub channels: Vec<ChannelView>,
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_not_delivered: u64,
    pub delivery_rate: f64,
    pub delivery_rate_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthView {
    pub key: String,
    pub label: String,
    pub total_sent: u64,
    pub delivered: u64,
    pub failed: u64,
    pub delivery_rate: f64,
    pub delivery_rate_label: String,
    pub has_data: bool,
}

impl From<MonthlyAggregate> for MonthView {
    fn from(m: MonthlyAggregate) -> Self {
        Self {
            delivery_rate_label: format_rate(m.delivery_rate),
            key: m.key,
            label: m.label,
            total_sent: m.total_sent,
            delivered: m.delivered,
            failed: m.failed,
            delivery_rate: m.delivery_rate,
            has_data: m.has_data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyReportResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub months: Vec<MonthView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestsReportResponse {
    pub analise: u64,
    pub execucao: u64,
    pub finalizados: u64,
    pub cancelados: u64,
    pub total: u64,
}

impl From<RequestsSummary> for RequestsReportResponse {
    fn from(s: RequestsSummary) -> Self {
        Self {
            analise: s.analise.total,
            execucao: s.execucao.total,
            finalizados: s.finalizados.total,
            cancelados: s.cancelados.total,
            total: s.total(),
        }
    }
}

fn bad_request(error: &str, message: impl Into<String>) -> ApiError {
    metrics::counter!("api.validation_errors").increment(1);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error, message)))
}

/// Caller's bearer token, falling back to the configured service token.
fn resolve_token(headers: &HeaderMap, state: &AppState) -> Result<String, ApiError> {
    let forwarded = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    forwarded
        .map(str::to_string)
        .or_else(|| state.default_token.clone())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "missing_token",
                    "a bearer token is required to query delivery metrics",
                )),
            )
        })
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn build_query(params: &ReportParams, state: &AppState) -> Result<DatasetQuery, ApiError> {
    let range = DateRange::new(params.from, params.to)
        .map_err(|e| bad_request("invalid_range", e.to_string()))?;

    let days = (params.to - params.from).num_days() + 1;
    if days > state.max_range_days {
        return Err(bad_request(
            "range_too_long",
            format!("range spans {days} days, limit is {}", state.max_range_days),
        ));
    }

    Ok(DatasetQuery {
        range,
        cost_center_id: non_blank(&params.cost_center_id),
        campaign_id: non_blank(&params.campaign_id),
    })
}

fn parse_channels(raw: Option<&str>) -> Result<Vec<DeliveryChannel>, ApiError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(DeliveryChannel::ALL.to_vec());
    };
    raw.split(',')
        .map(|part| part.parse::<DeliveryChannel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| bad_request("invalid_channel", e.to_string()))
}

/// GET /v1/reports/channels: Per-channel delivery totals and status mix.
#[utoipa::path(
    get,
    path = "/v1/reports/channels",
    tag = "Reports",
    params(ReportParams),
    responses(
        (status = 200, description = "Per-channel report", body = ChannelReportResponse),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "No token available", body = ErrorResponse),
    )
)]
pub async fn handle_channel_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<ChannelReportResponse>, ApiError> {
    let token = resolve_token(&headers, &state)?;
    let query = build_query(&params, &state)?;
    let channels = parse_channels(params.channels.as_deref())?;

    let report = state.reports.channel_report(&token, &query, &channels).await;
    if report.totals.total_sent == 0 {
        warn!(from = %params.from, to = %params.to, "Channel report has no data");
    }

    Ok(Json(ChannelReportResponse {
        from: params.from,
        to: params.to,
        channels: report.channels.into_iter().map(ChannelView::from).collect(),
        total_sent: report.totals.total_sent,
        total_delivered: report.totals.total_delivered,
        total_not_delivered: report.totals.total_not_delivered,
        delivery_rate: report.totals.delivery_rate,
        delivery_rate_label: format_rate(report.totals.delivery_rate),
    }))
}

/// GET /v1/reports/monthly: Delivery totals per calendar month.
#[utoipa::path(
    get,
    path = "/v1/reports/monthly",
    tag = "Reports",
    params(ReportParams),
    responses(
        (status = 200, description = "Monthly report", body = MonthlyReportResponse),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "No token available", body = ErrorResponse),
    )
)]
pub async fn handle_monthly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<MonthlyReportResponse>, ApiError> {
    let token = resolve_token(&headers, &state)?;
    let query = build_query(&params, &state)?;

    let months = state.reports.monthly_report(&token, &query).await;

    Ok(Json(MonthlyReportResponse {
        from: params.from,
        to: params.to,
        months: months.into_iter().map(MonthView::from).collect(),
    }))
}

/// GET /v1/reports/requests: Request counts per workflow stage.
#[utoipa::path(
    get,
    path = "/v1/reports/requests",
    tag = "Reports",
    params(ReportParams),
    responses(
        (status = 200, description = "Request summary", body = RequestsReportResponse),
        (status = 400, description = "Invalid filters", body = ErrorResponse),
        (status = 401, description = "No token available", body = ErrorResponse),
    )
)]
pub async fn handle_requests_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ReportParams>,
) -> Result<Json<RequestsReportResponse>, ApiError> {
    let token = resolve_token(&headers, &state)?;
    let query = build_query(&params, &state)?;

    let summary = state.reports.requests_summary(&token, &query).await;
    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channels() {
        assert_eq!(parse_channels(None).unwrap().len(), 5);
        assert_eq!(parse_channels(Some(" ")).unwrap().len(), 5);
        assert_eq!(
            parse_channels(Some("email,sms")).unwrap(),
            vec![DeliveryChannel::Email, DeliveryChannel::Sms]
        );
        let (status, _) = parse_channels(Some("email,fax")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  ".to_string())), None);
        assert_eq!(non_blank(&Some(" cc-1 ".to_string())), Some("cc-1".to_string()));
        assert_eq!(non_blank(&None), None);
    }
}
