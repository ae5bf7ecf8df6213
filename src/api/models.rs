use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MAX_RESULTS_LIMIT: u32 = 1000;

/// Inbound scrape request as sent by the caller. Every field is loose JSON so
/// that validation, not deserialization, decides what is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub curl_command: Option<Value>,
    pub max_results: Option<Value>,
    pub cookies: Option<Value>,
    pub requirement_id: Option<Value>,
    pub company_id: Option<Value>,
    pub rdx_user_id: Option<Value>,
    pub rdx_user_name: Option<Value>,
}

/// The credential bundle forwarded to n8n.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeInput {
    Curl {
        #[serde(rename = "curlCommand")]
        curl_command: String,
    },
    Session {
        cookies: String,
        #[serde(rename = "requirementId")]
        requirement_id: Value,
        #[serde(rename = "companyId")]
        company_id: Value,
        #[serde(rename = "rdxUserId")]
        rdx_user_id: Value,
        #[serde(rename = "rdxUserName")]
        rdx_user_name: Value,
    },
}

/// A validated request, ready to be sent to the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeJob {
    pub input: ScrapeInput,
    pub max_results: u32,
}

/// JSON body POSTed to the n8n webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    #[serde(flatten)]
    pub input: &'a ScrapeInput,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeRequest {
    /// Anything that is not a JSON object is read as an empty request.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => ScrapeRequest::default(),
        }
    }

    pub fn validate(self) -> Result<ScrapeJob> {
        let max_results = clamp_max_results(self.max_results.as_ref());

        if let Some(curl_command) = non_empty_string(self.curl_command) {
            return Ok(ScrapeJob {
                input: ScrapeInput::Curl { curl_command },
                max_results,
            });
        }

        let Some(cookies) = non_empty_string(self.cookies) else {
            return Err(AppError::ValidationError("curlCommand is required".to_string()));
        };

        let fields = [
            ("requirementId", self.requirement_id),
            ("companyId", self.company_id),
            ("rdxUserId", self.rdx_user_id),
            ("rdxUserName", self.rdx_user_name),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| !is_present(value.as_ref()))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let [requirement_id, company_id, rdx_user_id, rdx_user_name] =
            fields.map(|(_, value)| value.unwrap_or(Value::Null));

        Ok(ScrapeJob {
            input: ScrapeInput::Session {
                cookies,
                requirement_id,
                company_id,
                rdx_user_id,
                rdx_user_name,
            },
            max_results,
        })
    }
}

impl ScrapeJob {
    pub fn payload(&self) -> WebhookPayload<'_> {
        WebhookPayload {
            input: &self.input,
            max_results: self.max_results,
        }
    }
}

/// Reads `maxResults` leniently: numbers are truncated by value, strings may
/// carry trailing junk after their leading digits. Zero, garbage and absence
/// all fall back to the default before clamping into [1, 1000].
///
/// Numbers are never re-read through their decimal text, so `1e21` counts as
/// a huge value and clamps to 1000 rather than parsing as `1`.
pub fn clamp_max_results(raw: Option<&Value>) -> u32 {
    let parsed = raw
        .and_then(parse_leading_int)
        .filter(|n| *n != 0)
        .unwrap_or(i64::from(DEFAULT_MAX_RESULTS));
    parsed.clamp(1, i64::from(MAX_RESULTS_LIMIT)) as u32
}

fn parse_leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, rest) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return None;
            }
            let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
            Some(if negative { -magnitude } else { magnitude })
        }
        _ => None,
    }
}

fn non_empty_string(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

pub fn scrape_usage() -> Value {
    json!({
        "curlCommand": "The complete cURL command copied from Chrome DevTools Network tab",
        "maxResults": "Optional number of profiles to scrape (default: 10)"
    })
}

pub fn method_usage() -> Value {
    json!({
        "method": "POST",
        "body": {
            "curlCommand": "string (required) - cURL command from Chrome DevTools",
            "maxResults": "number (optional) - Maximum profiles to scrape (default: 10)"
        }
    })
}
