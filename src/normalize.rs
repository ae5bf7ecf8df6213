use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// The reply shapes the n8n workflow is known to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResponse {
    /// `{candidates: [...], totalCandidates?, scrapedAt?}`
    Candidates {
        candidates: Vec<Value>,
        total_candidates: Option<u64>,
        scraped_at: Option<String>,
    },
    /// A bare list of profile objects.
    Profiles(Vec<Value>),
    /// Any other JSON object, counted as one result.
    Single(Value),
    /// `null` or a primitive. Passed through untouched.
    Opaque(Value),
}

/// Payload half of the normalized result, flattened next to `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultPayload {
    Candidates {
        #[serde(rename = "totalCandidates")]
        total_candidates: u64,
        #[serde(rename = "scrapedAt")]
        scraped_at: String,
        candidates: Vec<Value>,
    },
    Profiles {
        #[serde(rename = "totalProfiles")]
        total_profiles: usize,
        profiles: Vec<Value>,
    },
    Data {
        data: Value,
    },
}

impl WorkflowResponse {
    /// Classifies a reply. A `candidates` field is only honoured when it is a
    /// list; otherwise the object falls through to `Single`.
    pub fn decode(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.get("candidates").is_some_and(Value::is_array) => {
                let candidates = match map.remove("candidates") {
                    Some(Value::Array(list)) => list,
                    _ => Vec::new(),
                };
                let total_candidates = map
                    .get("totalCandidates")
                    .and_then(Value::as_u64)
                    .filter(|total| *total > 0);
                let scraped_at = map
                    .get("scrapedAt")
                    .and_then(Value::as_str)
                    .filter(|ts| !ts.is_empty())
                    .map(str::to_string);
                WorkflowResponse::Candidates {
                    candidates,
                    total_candidates,
                    scraped_at,
                }
            }
            Value::Array(list) => WorkflowResponse::Profiles(list),
            Value::Object(_) => WorkflowResponse::Single(value),
            other => WorkflowResponse::Opaque(other),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            WorkflowResponse::Candidates { .. } => "candidates",
            WorkflowResponse::Profiles(_) => "profiles",
            WorkflowResponse::Single(_) => "single",
            WorkflowResponse::Opaque(_) => "opaque",
        }
    }

    /// Number of results the workflow delivered.
    pub fn count(&self) -> u32 {
        let count = match self {
            WorkflowResponse::Candidates { candidates, .. } => candidates.len(),
            WorkflowResponse::Profiles(profiles) => profiles.len(),
            WorkflowResponse::Single(_) => 1,
            WorkflowResponse::Opaque(_) => 0,
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn into_payload(self) -> ResultPayload {
        match self {
            WorkflowResponse::Candidates {
                candidates,
                total_candidates,
                scraped_at,
            } => ResultPayload::Candidates {
                total_candidates: total_candidates.unwrap_or(candidates.len() as u64),
                scraped_at: scraped_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
                candidates,
            },
            WorkflowResponse::Profiles(profiles) => ResultPayload::Profiles {
                total_profiles: profiles.len(),
                profiles,
            },
            WorkflowResponse::Single(data) | WorkflowResponse::Opaque(data) => ResultPayload::Data { data },
        }
    }
}

impl ResultPayload {
    /// Individual records, one per dataset entry. Primitive passthrough data
    /// has none.
    pub fn items(&self) -> &[Value] {
        match self {
            ResultPayload::Candidates { candidates, .. } => candidates,
            ResultPayload::Profiles { profiles, .. } => profiles,
            ResultPayload::Data { data } if data.is_object() => std::slice::from_ref(data),
            ResultPayload::Data { .. } => &[],
        }
    }
}
