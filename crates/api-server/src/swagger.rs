//! OpenAPI specification, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaign Dashboard API",
        version = "0.1.0",
        description = "Delivery reports over the Printpost metrics API.\n\nPer-channel and per-month rollups of email, SMS, WhatsApp, RCS and letter campaigns.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Reports", description = "Per-channel, monthly and request-stage delivery reports"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Reports
        crate::report_rest::handle_channel_report,
        crate::report_rest::handle_monthly_report,
        crate::report_rest::handle_requests_report,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        campaign_core::DeliveryChannel,
        campaign_reporting::StatusSlice,
        crate::report_rest::ChannelView,
        crate::report_rest::ChannelReportResponse,
        crate::report_rest::MonthView,
        crate::report_rest::MonthlyReportResponse,
        crate::report_rest::RequestsReportResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
