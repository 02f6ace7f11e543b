use admin_console::config::get_configuration;
use admin_console::services::BackendClient;
use admin_console::startup::build_router;
use admin_console::AppState;
use console_core::observability::init_tracing;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let telemetry = &configuration.telemetry;
    init_tracing(
        &telemetry.service_name,
        &telemetry.log_level,
        telemetry.log_format,
        telemetry.otlp_endpoint.as_deref(),
    )
    .map_err(|e| anyhow::anyhow!("Telemetry error: {}", e))?;

    console_core::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Metrics registry error: {}", e))?;

    let api = BackendClient::new(&configuration.backend).map_err(|e| {
        tracing::error!(error = %e, "Failed to build backend client");
        anyhow::anyhow!("Backend client error: {}", e)
    })?;
    info!(base_url = %api.base_url(), "Backend client ready");

    let state = AppState::new(Arc::new(api), configuration.console.clone());
    let app = build_router(state, &configuration.server);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting admin-console on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
