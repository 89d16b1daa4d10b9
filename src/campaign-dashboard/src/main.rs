//! Campaign Dashboard: delivery reporting over the Printpost metrics API.
//!
//! Main entry point that loads configuration, wires the report service and
//! starts the HTTP server.

use campaign_api::ApiServer;
use campaign_core::config::AppConfig;
use campaign_integrations::{PrintpostClient, ReportService};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Campaign delivery reports over the Printpost metrics API")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "CAMPAIGN_DASHBOARD_CONFIG")]
    config: Option<String>,

    /// Node identifier (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics API base URL (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__PRINTPOST__BASE_URL")]
    printpost_url: Option<String>,

    /// Fetch cache TTL in seconds, 0 disables (overrides config)
    #[arg(long)]
    cache_ttl_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_dashboard=info,campaign_integrations=info,tower_http=info".into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Dashboard starting up");

    // Load configuration
    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(url) = cli.printpost_url {
        config.printpost.base_url = url;
    }
    if let Some(ttl) = cli.cache_ttl_secs {
        config.printpost.cache_ttl_secs = ttl;
    }

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        printpost_url = %config.printpost.base_url,
        cache_ttl_secs = config.printpost.cache_ttl_secs,
        service_token = config.printpost.token.is_some(),
        "Configuration loaded"
    );

    let client = PrintpostClient::new(&config.printpost)?;
    let reports = Arc::new(ReportService::new(
        Arc::new(client),
        Duration::from_secs(config.printpost.cache_ttl_secs),
        &config.reporting,
    ));

    let api_server = ApiServer::new(config.clone(), reports.clone());

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    // Spawn cache maintenance task
    let reports_for_maintenance = reports.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let purged = reports_for_maintenance.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "Expired fetch cache entries removed");
            }
        }
    });

    info!("Campaign Dashboard is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
