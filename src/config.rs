use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n.grrbaow.com/webhook/naukri-scrapper";

/// Large scrapes (1000 profiles) routinely take several minutes on the n8n side.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub webhook_url: String,
    pub webhook_secret: Option<String>,
    pub webhook_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let webhook_url = env::var("N8N_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string());

        let webhook_secret = non_empty(env::var("N8N_WEBHOOK_SECRET").ok());

        let webhook_timeout = match env::var("N8N_WEBHOOK_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout_secs(&raw)?,
            Err(_) => DEFAULT_WEBHOOK_TIMEOUT,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            webhook_url,
            webhook_secret,
            webhook_timeout,
        })
    }

    /// Config pointing at `webhook_url` with every other setting at its default.
    pub fn with_webhook(webhook_url: impl Into<String>) -> Self {
        Config {
            server_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
            webhook_url: webhook_url.into(),
            webhook_secret: None,
            webhook_timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.webhook_timeout = timeout;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = non_empty(Some(secret.into()));
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::ConfigError(format!("Invalid N8N_WEBHOOK_TIMEOUT_SECS: {}", e)))?;
    if secs == 0 {
        return Err(AppError::ConfigError("N8N_WEBHOOK_TIMEOUT_SECS must be greater than zero".to_string()));
    }
    Ok(Duration::from_secs(secs))
}
