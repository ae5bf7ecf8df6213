use anyhow::Context;
use tokio::net::TcpListener;
use naukri_cv_scraper::{
    api::routes::create_router,
    config::Config,
    init_tracing,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration and create application state
    let config = Config::load().context("Failed to load configuration")?;
    let app_state = AppState::new(config).context("Failed to build application state")?;

    let server_addr = app_state.config.server_addr;
    tracing::info!(
        webhook = %app_state.config.webhook_url,
        timeout_secs = app_state.config.webhook_timeout.as_secs(),
        secret_configured = app_state.config.webhook_secret.is_some(),
        "Configuration loaded"
    );

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;

    // Start the server
    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
