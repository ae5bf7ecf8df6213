use reqwest::{Client, ClientBuilder};
use serde_json::Value;

use crate::api::models::ScrapeJob;
use crate::config::Config;
use crate::error::{AppError, Result};

/// Client for the n8n webhook that does the actual scraping. One POST per
/// job, no retries.
#[derive(Clone)]
pub struct WorkflowClient {
    client: Client,
    webhook_url: String,
    webhook_secret: Option<String>,
}

impl WorkflowClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.webhook_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Sends the job to n8n and returns the raw JSON reply.
    pub async fn run(&self, job: &ScrapeJob) -> Result<Value> {
        let mut request = self.client.post(&self.webhook_url).json(&job.payload());

        if let Some(secret) = &self.webhook_secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "n8n webhook returned an error status");
            return Err(AppError::from_upstream_status(status.as_u16(), error_details(&body)));
        }

        serde_json::from_str(&body).map_err(|e| AppError::DecodeError {
            message: e.to_string(),
            details: Value::String(body.clone()),
        })
    }
}

/// Error bodies are kept as JSON when they parse, as text otherwise.
fn error_details(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
