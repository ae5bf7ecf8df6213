//! Batch-job variant: read the job input from the key-value store, run the
//! scrape once, and persist every record plus summary slots instead of
//! answering an HTTP caller.

pub mod storage;

use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};

use crate::api::models::ScrapeRequest;
use crate::diagnostics::Assessment;
use crate::error::{AppError, Result};
use crate::pipeline::{self, ScrapeOutcome};
use crate::workflow::WorkflowClient;
use storage::OutputSink;

pub const INPUT_KEY: &str = "INPUT";
pub const OUTPUT_KEY: &str = "OUTPUT";
pub const QUOTA_WARNING_KEY: &str = "QUOTA_WARNING";
pub const ERROR_INFO_KEY: &str = "ERROR_INFO";
pub const SCRAPING_STATS_KEY: &str = "SCRAPING_STATS";
pub const ERROR_LOG_KEY: &str = "ERROR_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub requested: u32,
    pub received: u32,
    pub items_saved: usize,
}

/// Runs one job against `sink`. Failures are recorded in `OUTPUT` and
/// `ERROR_LOG` before being returned.
pub async fn run_job(workflow: &WorkflowClient, sink: &dyn OutputSink) -> Result<JobSummary> {
    let started = Instant::now();
    tracing::info!("NAUKRI CV SCRAPER STARTED");

    match process(workflow, sink, started).await {
        Ok(summary) => {
            tracing::info!(saved = summary.items_saved, "Actor finished successfully");
            Ok(summary)
        }
        Err(err) => {
            let report = err.report();
            report.log(&err);
            if let Err(record_err) = record_failure(sink, &err, &report.guidance).await {
                tracing::error!(%record_err, "Failed to persist error records");
            }
            Err(err)
        }
    }
}

async fn process(workflow: &WorkflowClient, sink: &dyn OutputSink, started: Instant) -> Result<JobSummary> {
    let input = sink.get_value(INPUT_KEY).await?.unwrap_or(Value::Null);
    let job = ScrapeRequest::from_value(input).validate()?;

    let outcome = pipeline::execute(workflow, &job, started).await?;

    for item in outcome.items() {
        sink.push_data(item.clone()).await?;
    }
    let items_saved = outcome.items().len();

    let output = serde_json::to_value(&outcome.result)
        .map_err(|e| AppError::StorageError(format!("Failed to serialize output: {}", e)))?;
    sink.set_value(OUTPUT_KEY, output).await?;

    record_diagnosis(sink, &outcome).await?;

    Ok(JobSummary {
        requested: outcome.diagnosis.requested,
        received: outcome.diagnosis.received,
        items_saved,
    })
}

async fn record_diagnosis(sink: &dyn OutputSink, outcome: &ScrapeOutcome) -> Result<()> {
    let diagnosis = &outcome.diagnosis;
    let timestamp = Utc::now().to_rfc3339();

    match diagnosis.assessment {
        Assessment::Shortfall { .. } => {
            if let Some(warning) = diagnosis.quota_warning() {
                let mut warning = serde_json::to_value(warning)
                    .map_err(|e| AppError::StorageError(format!("Failed to serialize quota warning: {}", e)))?;
                if let Some(fields) = warning.as_object_mut() {
                    fields.insert("timestamp".to_string(), json!(timestamp));
                }
                sink.set_value(QUOTA_WARNING_KEY, warning).await?;
            }
        }
        Assessment::Empty => {
            sink.set_value(
                ERROR_INFO_KEY,
                json!({
                    "error": "No profiles scraped",
                    "requested": diagnosis.requested,
                    "received": 0,
                    "timestamp": timestamp,
                    "possibleReasons": [
                        "Cookies expired",
                        "Quota exhausted",
                        "Invalid search parameters",
                        "Authentication failed"
                    ]
                }),
            )
            .await?;
        }
        Assessment::Complete | Assessment::Surplus { .. } => {}
    }

    sink.set_value(
        SCRAPING_STATS_KEY,
        json!({
            "requested": diagnosis.requested,
            "received": diagnosis.received,
            "shortfall": diagnosis.shortfall(),
            "successRate": diagnosis.success_rate(),
            "timeTakenSeconds": outcome.result.stats.time_taken_seconds,
            "timestamp": timestamp,
            "quotaExhausted": diagnosis.shortfall() > 0,
            "likelyQuotaIssue": diagnosis.likely_quota_issue()
        }),
    )
    .await
}

async fn record_failure(sink: &dyn OutputSink, err: &AppError, guidance: &[&str]) -> Result<()> {
    let timestamp = Utc::now().to_rfc3339();

    sink.set_value(
        OUTPUT_KEY,
        json!({
            "success": false,
            "error": err.to_string(),
            "details": err.details(),
            "timestamp": timestamp
        }),
    )
    .await?;

    sink.set_value(
        ERROR_LOG_KEY,
        json!({
            "error": err.to_string(),
            "kind": err.kind(),
            "status": err.upstream_status(),
            "response": err.details(),
            "guidance": guidance,
            "timestamp": timestamp
        }),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use super::storage::MemorySink;

    #[tokio::test]
    async fn invalid_input_is_recorded_without_calling_n8n() {
        // Nothing listens on port 9; validation must fail before any request.
        let config = Config::with_webhook("http://127.0.0.1:9/webhook");
        let workflow = WorkflowClient::new(&config).unwrap();
        let sink = MemorySink::with_input(json!({"maxResults": 5}));

        let err = run_job(&workflow, &sink).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let output = sink.value(OUTPUT_KEY).unwrap();
        assert_eq!(output["success"], json!(false));
        assert_eq!(output["error"], json!("curlCommand is required"));

        let log = sink.value(ERROR_LOG_KEY).unwrap();
        assert_eq!(log["kind"], json!("validation"));
        assert_eq!(log["status"], Value::Null);
        assert!(sink.items().is_empty());
    }
}
