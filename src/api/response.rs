use serde::Serialize;
use serde_json::Value;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::ErrorReport;
use crate::pipeline::NormalizedResult;

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    pub stats: ErrorStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub time_taken_seconds: f64,
}

#[derive(Serialize)]
pub struct UsageBody {
    pub success: bool,
    pub error: &'static str,
    pub usage: Value,
}

pub fn success(result: NormalizedResult) -> Response {
    (StatusCode::OK, Json(result)).into_response()
}

/// Renders a classified failure. `usage` is attached to validation errors so
/// the caller sees what a correct body looks like.
pub fn failure(report: &ErrorReport, usage: Option<Value>, time_taken_seconds: f64) -> Response {
    let body = ErrorBody {
        success: false,
        error: report.message.clone(),
        details: report.details.clone(),
        guidance: (!report.guidance.is_empty()).then(|| report.guidance.clone()),
        usage,
        stats: ErrorStats { time_taken_seconds },
    };

    (report.status, Json(body)).into_response()
}

pub fn usage(status: StatusCode, error: &'static str, usage: Value) -> Response {
    (
        status,
        Json(UsageBody {
            success: false,
            error,
            usage,
        }),
    )
        .into_response()
}
