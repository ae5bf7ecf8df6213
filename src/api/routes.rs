use axum::{
    routing::{get, post, MethodRouter},
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use chrono::Utc;
use serde_json::Value;
use std::time::Instant;

use crate::api::models::{HealthResponse, ScrapeRequest, method_usage, scrape_usage};
use crate::api::response;
use crate::pipeline::{self, elapsed_seconds};
use crate::AppState;

pub const SERVICE_NAME: &str = "Naukri CV Scraper API";

pub fn create_router(app_state: AppState) -> Router {
    let scrape: MethodRouter<AppState> = post(scrape_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed);

    Router::new()
        .route("/scrape", scrape.clone())
        .route("/api/scrape", scrape)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn scrape_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    tracing::info!("NAUKRI CV SCRAPER API");

    let request = match body {
        Ok(Json(value)) => ScrapeRequest::from_value(value),
        Err(rejection) => {
            tracing::warn!(%rejection, "Request body is not usable JSON");
            ScrapeRequest::default()
        }
    };

    let job = match request.validate() {
        Ok(job) => job,
        Err(err) => {
            tracing::error!("{}", err);
            return response::failure(&err.report(), Some(scrape_usage()), elapsed_seconds(started));
        }
    };

    match pipeline::execute(&state.workflow, &job, started).await {
        Ok(outcome) => {
            tracing::info!("API request completed successfully");
            response::success(outcome.result)
        }
        Err(err) => {
            let report = err.report();
            report.log(&err);
            response::failure(&report, None, elapsed_seconds(started))
        }
    }
}

async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    response::usage(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed. Use POST request.",
        method_usage(),
    )
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}
