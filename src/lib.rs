pub mod api;
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod workflow;

use std::sync::Arc;
use config::Config;
use error::Result;
use workflow::WorkflowClient;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workflow: WorkflowClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let workflow = WorkflowClient::new(&config)?;
        Ok(AppState {
            config: Arc::new(config),
            workflow,
        })
    }
}

/// Installs the `tracing` subscriber shared by both binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,naukri_cv_scraper=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn state_shares_the_config_it_was_built_from() {
        let config = Config::with_webhook("http://127.0.0.1:5678/webhook/naukri-scrapper")
            .with_timeout(Duration::from_secs(300));
        let state = AppState::new(config).unwrap();

        assert_eq!(state.config.webhook_url, state.workflow.webhook_url());
        assert_eq!(state.config.webhook_timeout, Duration::from_secs(300));
        assert_eq!(state.config.server_addr.port(), 3000);
    }
}
