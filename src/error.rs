use axum::http::StatusCode;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("n8n webhook is not accessible: {0}")]
    ConnectionRefused(String),

    #[error("Request to n8n webhook timed out: {0}")]
    TimeoutError(String),

    #[error("n8n webhook rejected the credentials with status {status}")]
    UpstreamAuthError { status: u16, details: Value },

    #[error("n8n workflow failed with status 500")]
    UpstreamServerError { details: Value },

    #[error("Request failed with status code {status}")]
    UpstreamStatusError { status: u16, details: Value },

    #[error("Failed to reach n8n webhook: {0}")]
    TransportError(String),

    #[error("Failed to decode n8n response: {message}")]
    DecodeError { message: String, details: Value },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// What the operator sees for a failed request: status, message, raw
/// upstream details and the remediation steps.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub details: Value,
    pub guidance: Vec<&'static str>,
}

impl AppError {
    /// Maps a non-2xx webhook reply to the matching upstream variant.
    pub fn from_upstream_status(status: u16, details: Value) -> Self {
        match status {
            401 | 403 => AppError::UpstreamAuthError { status, details },
            500 => AppError::UpstreamServerError { details },
            _ => AppError::UpstreamStatusError { status, details },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::ConnectionRefused(_) => "connection_refused",
            AppError::TimeoutError(_) => "timeout",
            AppError::UpstreamAuthError { .. } => "upstream_auth",
            AppError::UpstreamServerError { .. } => "upstream_server",
            AppError::UpstreamStatusError { .. } => "upstream_status",
            AppError::TransportError(_) => "transport",
            AppError::DecodeError { .. } => "decode",
            AppError::ConfigError(_) => "config",
            AppError::StorageError(_) => "storage",
        }
    }

    /// Status code the webhook answered with, if it answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamAuthError { status, .. } | AppError::UpstreamStatusError { status, .. } => {
                Some(*status)
            }
            AppError::UpstreamServerError { .. } => Some(500),
            _ => None,
        }
    }

    pub fn details(&self) -> Value {
        match self {
            AppError::UpstreamAuthError { details, .. }
            | AppError::UpstreamServerError { details }
            | AppError::UpstreamStatusError { details, .. }
            | AppError::DecodeError { details, .. } => details.clone(),
            _ => Value::Null,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let (status, message, guidance) = match self {
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                vec![
                    "Provide curlCommand in request body",
                    "Or provide cookies, requirementId, companyId, rdxUserId and rdxUserName",
                ],
            ),
            AppError::ConnectionRefused(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "n8n webhook is not accessible".to_string(),
                vec!["Check if n8n is running", "Verify webhook URL is correct"],
            ),
            AppError::TimeoutError(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Request timed out".to_string(),
                vec!["Reduce maxResults", "Check n8n workflow performance"],
            ),
            AppError::UpstreamAuthError { .. } => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
                vec!["Get fresh cURL command with valid cookies", "Check Naukri login session"],
            ),
            AppError::UpstreamServerError { .. } => (
                StatusCode::BAD_GATEWAY,
                "n8n workflow error".to_string(),
                vec!["Check n8n workflow logs", "Test with smaller maxResults"],
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                other.to_string(),
                vec!["Review n8n workflow logs", "Verify configurations"],
            ),
        };

        ErrorReport {
            status,
            message,
            details: self.details(),
            guidance,
        }
    }
}

impl ErrorReport {
    pub fn log(&self, cause: &AppError) {
        tracing::error!(status = self.status.as_u16(), kind = cause.kind(), "SCRAPING FAILED: {}", cause);
        if !self.details.is_null() {
            tracing::error!(details = %self.details, "Error details from n8n");
        }
        tracing::info!("Fix: {}", self.message);
        for step in &self.guidance {
            tracing::info!("  - {}", step);
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TimeoutError(err.to_string())
        } else if is_connection_refused(&err) {
            AppError::ConnectionRefused(err.to_string())
        } else if err.is_decode() {
            AppError::DecodeError {
                message: err.to_string(),
                details: Value::Null,
            }
        } else {
            AppError::TransportError(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

fn is_connection_refused(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

pub type Result<T> = std::result::Result<T, AppError>;
