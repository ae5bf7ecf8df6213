//! Requested-vs-received analysis.
//!
//! n8n never tells us *why* it returned fewer profiles than asked for, so the
//! cause is inferred from the count alone: Resdex pages hold 50 profiles, and
//! a count that lands exactly on a page boundary almost always means the CV
//! viewing quota ran out between pages.
//!
//! [`assess`] and the [`Diagnosis`] accessors are pure; [`Diagnosis::log`] is
//! the only place that writes to the log.

use serde::Serialize;

pub const PAGE_SIZE: u32 = 50;
pub const LOW_COUNT_THRESHOLD: u32 = 100;

const SHORTFALL_RECOMMENDATIONS: &[&str] = &[
    "Check Naukri Resdex CV viewing quota",
    "Get fresh cURL command",
    "Reduce maxResults",
];

const EMPTY_RECOMMENDATIONS: &[&str] = &[
    "Get fresh cURL command",
    "Check if cookies expired",
    "Verify Naukri account quota",
];

const EMPTY_REASONS: &[&str] = &[
    "Cookies expired",
    "Quota exhausted",
    "Invalid search parameters",
    "Authentication failed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallKind {
    /// Whole pages arrived, then nothing: quota exhausted.
    PagedQuota { pages_received: u32, pages_requested: u32 },
    /// Fewer than [`LOW_COUNT_THRESHOLD`] profiles.
    LowCount,
    Partial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Complete,
    /// The workflow returned more than requested.
    Surplus { extra: u32 },
    Shortfall {
        kind: ShortfallKind,
        shortfall: u32,
        percentage: String,
    },
    Empty,
}

pub fn assess(requested: u32, received: u32) -> Assessment {
    if received == 0 {
        return Assessment::Empty;
    }
    if received >= requested {
        return match received - requested {
            0 => Assessment::Complete,
            extra => Assessment::Surplus { extra },
        };
    }

    let kind = if received % PAGE_SIZE == 0 {
        ShortfallKind::PagedQuota {
            pages_received: received / PAGE_SIZE,
            pages_requested: requested.div_ceil(PAGE_SIZE),
        }
    } else if received < LOW_COUNT_THRESHOLD {
        ShortfallKind::LowCount
    } else {
        ShortfallKind::Partial
    };

    Assessment::Shortfall {
        kind,
        shortfall: requested - received,
        percentage: percentage(requested, received),
    }
}

/// `received / requested * 100` with one decimal place.
pub fn percentage(requested: u32, received: u32) -> String {
    if requested == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", f64::from(received) / f64::from(requested) * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QuotaWarning {
    #[serde(rename_all = "camelCase")]
    Shortfall {
        message: &'static str,
        requested: u32,
        received: u32,
        shortfall: u32,
        percentage_received: String,
        likely_quota_issue: bool,
        pages_received: u32,
        pages_requested: u32,
        recommendations: Vec<&'static str>,
    },
    #[serde(rename_all = "camelCase")]
    Critical {
        message: &'static str,
        critical: bool,
        requested: u32,
        received: u32,
        possible_reasons: Vec<&'static str>,
        recommendations: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub requested: u32,
    pub received: u32,
    pub success_rate: String,
    pub time_taken_seconds: f64,
    pub quota_warning: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub requested: u32,
    pub received: u32,
    pub assessment: Assessment,
}

impl Diagnosis {
    pub fn new(requested: u32, received: u32) -> Self {
        Self {
            requested,
            received,
            assessment: assess(requested, received),
        }
    }

    pub fn is_shortfall(&self) -> bool {
        matches!(self.assessment, Assessment::Shortfall { .. })
    }

    /// Missing profiles; zero when the workflow delivered everything or more.
    pub fn shortfall(&self) -> u32 {
        self.requested.saturating_sub(self.received)
    }

    /// True when the received count sits on a page boundary below the request.
    pub fn likely_quota_issue(&self) -> bool {
        self.received % PAGE_SIZE == 0 && self.received < self.requested
    }

    pub fn success_rate(&self) -> String {
        format!("{}%", percentage(self.requested, self.received))
    }

    pub fn stats(&self, time_taken_seconds: f64) -> Stats {
        Stats {
            requested: self.requested,
            received: self.received,
            success_rate: self.success_rate(),
            time_taken_seconds,
            quota_warning: self.is_shortfall(),
        }
    }

    pub fn quota_warning(&self) -> Option<QuotaWarning> {
        match &self.assessment {
            Assessment::Shortfall {
                kind,
                shortfall,
                percentage,
            } => Some(QuotaWarning::Shortfall {
                message: "Did not get all requested profiles",
                requested: self.requested,
                received: self.received,
                shortfall: *shortfall,
                percentage_received: percentage.clone(),
                likely_quota_issue: matches!(kind, ShortfallKind::PagedQuota { .. }),
                pages_received: self.received / PAGE_SIZE,
                pages_requested: self.requested.div_ceil(PAGE_SIZE),
                recommendations: SHORTFALL_RECOMMENDATIONS.to_vec(),
            }),
            Assessment::Empty => Some(QuotaWarning::Critical {
                message: "No profiles scraped",
                critical: true,
                requested: self.requested,
                received: 0,
                possible_reasons: EMPTY_REASONS.to_vec(),
                recommendations: EMPTY_RECOMMENDATIONS.to_vec(),
            }),
            Assessment::Complete | Assessment::Surplus { .. } => None,
        }
    }

    /// Likely causes for the assessment, most specific first.
    pub fn causes(&self) -> Vec<String> {
        match &self.assessment {
            Assessment::Shortfall { kind, .. } => match kind {
                ShortfallKind::PagedQuota {
                    pages_received,
                    pages_requested,
                } => vec![
                    format!("Got {} pages out of {} requested pages", pages_received, pages_requested),
                    "Naukri CV viewing quota exhausted".to_string(),
                    "Daily/monthly limit reached".to_string(),
                    "Check your Naukri Resdex dashboard for quota status".to_string(),
                ],
                ShortfallKind::LowCount => vec![
                    "Low profile count".to_string(),
                    "Naukri CV quota nearly exhausted".to_string(),
                    "CAPTCHA triggered (reduce scraping speed in n8n)".to_string(),
                    "Session expired midway".to_string(),
                ],
                ShortfallKind::Partial => vec![
                    "Partial success".to_string(),
                    "CV viewing quota ran out partway through".to_string(),
                    "CAPTCHA triggered after viewing many profiles".to_string(),
                    "Session timeout or network issues".to_string(),
                ],
            },
            Assessment::Empty => vec![
                "Cookies expired - get fresh cURL from Chrome DevTools".to_string(),
                "Account quota fully exhausted - check Naukri dashboard".to_string(),
                "Invalid search parameters in n8n workflow".to_string(),
                "Network/authentication issues".to_string(),
            ],
            Assessment::Complete | Assessment::Surplus { .. } => Vec::new(),
        }
    }

    pub fn actions(&self) -> &'static [&'static str] {
        match self.assessment {
            Assessment::Shortfall { .. } => &[
                "Login to Naukri Resdex and check CV viewing quota",
                "Wait for quota reset (check daily/monthly limits)",
                "Get fresh cookies (new cURL command from Chrome DevTools)",
                "Reduce maxResults to match available quota",
            ],
            Assessment::Empty => &[
                "Open Naukri Resdex in Chrome incognito mode",
                "Perform a search",
                "Copy fresh cURL command from Network tab",
                "Check Naukri account quota status",
            ],
            Assessment::Complete | Assessment::Surplus { .. } => &[],
        }
    }

    pub fn log(&self) {
        match &self.assessment {
            Assessment::Complete => tracing::info!("SUCCESS: Got all requested profiles!"),
            Assessment::Surplus { extra } => tracing::info!(
                extra,
                "SUCCESS: n8n returned {} more profiles than requested",
                extra
            ),
            Assessment::Shortfall {
                shortfall,
                percentage,
                ..
            } => {
                tracing::warn!(
                    requested = self.requested,
                    received = self.received,
                    "ATTENTION: Did not get all requested profiles. Missing: {} profiles (got {}%)",
                    shortfall,
                    percentage
                );
            }
            Assessment::Empty => {
                tracing::error!(requested = self.requested, "CRITICAL: No profiles scraped!");
            }
        }

        let causes = self.causes();
        if !causes.is_empty() {
            tracing::info!("Possible reasons:");
            for cause in &causes {
                tracing::info!("  - {}", cause);
            }
        }
        for (step, action) in self.actions().iter().enumerate() {
            tracing::info!("  {}. {}", step + 1, action);
        }
    }
}
