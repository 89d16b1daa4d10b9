//! API server: builds the router and serves HTTP plus the metrics exporter.

use crate::report_rest;
use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::get;
use axum::{Json, Router};
use campaign_core::config::AppConfig;
use campaign_integrations::ReportService;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

/// Assemble every route over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Reports
        .route("/v1/reports/channels", get(report_rest::handle_channel_report))
        .route("/v1/reports/monthly", get(report_rest::handle_monthly_report))
        .route("/v1/reports/requests", get(report_rest::handle_requests_report))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP API server for the delivery reports.
pub struct ApiServer {
    config: AppConfig,
    reports: Arc<ReportService>,
}

impl ApiServer {
    pub fn new(config: AppConfig, reports: Arc<ReportService>) -> Self {
        Self { config, reports }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            reports: self.reports.clone(),
            node_id: self.config.node_id.clone(),
            default_token: self.config.printpost.token.clone(),
            max_range_days: self.config.reporting.max_range_days,
            start_time: Instant::now(),
        };

        let app = build_router(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
