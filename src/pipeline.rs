use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::api::models::ScrapeJob;
use crate::diagnostics::{Diagnosis, QuotaWarning, Stats};
use crate::error::Result;
use crate::normalize::{ResultPayload, WorkflowResponse};
use crate::workflow::WorkflowClient;

/// What the caller (or the batch job's `OUTPUT` record) receives.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedResult {
    pub success: bool,
    #[serde(flatten)]
    pub payload: ResultPayload,
    pub stats: Stats,
    #[serde(rename = "quotaWarning", skip_serializing_if = "Option::is_none")]
    pub quota_warning: Option<QuotaWarning>,
}

pub struct ScrapeOutcome {
    pub result: NormalizedResult,
    pub diagnosis: Diagnosis,
}

impl ScrapeOutcome {
    pub fn items(&self) -> &[Value] {
        self.result.payload.items()
    }
}

/// Runs one job end to end: call n8n, classify the reply, diagnose the count.
pub async fn execute(workflow: &WorkflowClient, job: &ScrapeJob, started: Instant) -> Result<ScrapeOutcome> {
    tracing::info!(
        requested = job.max_results,
        webhook = workflow.webhook_url(),
        started_at = %chrono::Utc::now().to_rfc3339(),
        "Calling n8n workflow..."
    );

    let body = workflow.run(job).await?;
    tracing::info!("n8n workflow completed successfully");

    let response = WorkflowResponse::decode(body);
    let received = response.count();
    match &response {
        WorkflowResponse::Opaque(_) => tracing::warn!("Unexpected response format from n8n"),
        other => tracing::info!(shape = other.shape(), "Processing {} results from n8n", received),
    }

    let time_taken = elapsed_seconds(started);
    let diagnosis = Diagnosis::new(job.max_results, received);

    tracing::info!(
        received,
        requested = job.max_results,
        time_taken_secs = time_taken,
        "SCRAPING RESULTS"
    );
    diagnosis.log();
    tracing::info!(
        saved = received,
        success_rate = %diagnosis.success_rate(),
        time_taken_secs = time_taken,
        "SCRAPING COMPLETE"
    );
    if diagnosis.shortfall() > 0 {
        tracing::warn!("NOTE: Partial results (see quota details above)");
    }

    let result = NormalizedResult {
        success: true,
        payload: response.into_payload(),
        stats: diagnosis.stats(time_taken),
        quota_warning: diagnosis.quota_warning(),
    };

    Ok(ScrapeOutcome { result, diagnosis })
}

/// Seconds since `started`, rounded to one decimal place.
pub fn elapsed_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_result_omits_quota_warning() {
        let diagnosis = Diagnosis::new(2, 2);
        let result = NormalizedResult {
            success: true,
            payload: WorkflowResponse::decode(json!([{"id": 1}, {"id": 2}])).into_payload(),
            stats: diagnosis.stats(1.5),
            quota_warning: diagnosis.quota_warning(),
        };

        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "totalProfiles": 2,
                "profiles": [{"id": 1}, {"id": 2}],
                "stats": {
                    "requested": 2,
                    "received": 2,
                    "successRate": "100.0%",
                    "timeTakenSeconds": 1.5,
                    "quotaWarning": false
                }
            })
        );
    }

    #[test]
    fn elapsed_is_rounded_to_tenths() {
        let secs = elapsed_seconds(Instant::now());
        assert_eq!(secs, (secs * 10.0).round() / 10.0);
    }
}
