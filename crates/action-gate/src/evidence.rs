//! Per-check evidence recorded on every verification outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one observation saw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEvidence {
    pub attempt: u32,
    /// Settle delay awaited before reading
    pub waited_ms: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    pub matched: bool,
    /// Read or re-apply failure, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckEvidence {
    pub fn new(attempt: u32, waited_ms: u64) -> Self {
        Self {
            attempt,
            waited_ms,
            checked_at: Utc::now(),
            observed: None,
            matched: false,
            error: None,
        }
    }

    pub fn observed(mut self, observed: Option<String>, matched: bool) -> Self {
        self.observed = observed;
        self.matched = matched;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
