//! Frequency handling for spray programmes.
//!
//! The backend hands us a frequency either as a plain day count (`7`) or as
//! the free-text phrase it generated when the programme was created
//! (`"Every 7 days"`).  Older rows and hand-edited entries may carry anything
//! at all (`"weekly"`, `"10-14 day interval"`), so parsing is deliberately
//! *liberal*: take the first run of digits, otherwise fall back to
//! [`DEFAULT_FREQUENCY_DAYS`].  Nothing in here ever fails.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FREQUENCY_DAYS;

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").expect("digit pattern must compile");
}

/// Frequency as it arrives from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrequencySpec {
    /// Day count stored as a number (`frequency_days`).
    Numeric(i64),

    /// Descriptive text such as `"Every 14 days"`.
    Textual(String),
}

impl FrequencySpec {
    /// Interval in days, see [`parse_frequency`].
    pub fn days(&self) -> i64 {
        match self {
            FrequencySpec::Numeric(n) => *n,
            FrequencySpec::Textual(text) => DIGIT_RUN
                .find(text)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .unwrap_or(DEFAULT_FREQUENCY_DAYS),
        }
    }

    /// Text the backend expects in its `frequency` column.
    pub fn to_backend_text(&self) -> String {
        match self {
            FrequencySpec::Numeric(n) => format!("Every {} days", n),
            FrequencySpec::Textual(text) => text.clone(),
        }
    }
}

/// Normalise an optional frequency into a day count.
///
/// Numbers pass through unchanged, including zero and negatives; rejecting
/// those is [`FrequencyDays::new`]'s job.  Missing input or text without any
/// digits yields the 7-day default.
pub fn parse_frequency(spec: Option<&FrequencySpec>) -> i64 {
    spec.map(FrequencySpec::days).unwrap_or(DEFAULT_FREQUENCY_DAYS)
}

impl From<i64> for FrequencySpec {
    fn from(days: i64) -> Self {
        FrequencySpec::Numeric(days)
    }
}

impl From<&str> for FrequencySpec {
    fn from(text: &str) -> Self {
        FrequencySpec::Textual(text.to_string())
    }
}

impl fmt::Display for FrequencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencySpec::Numeric(1) => write!(f, "Every day"),
            FrequencySpec::Numeric(n) => write!(f, "Every {} days", n),
            FrequencySpec::Textual(text) => write!(f, "{}", text),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical day count used by the due-date math.
// ---------------------------------------------------------------------------

/// A validated, strictly positive interval in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FrequencyDays(i64);

impl FrequencyDays {
    /// `None` for zero or negative intervals, which would never advance the
    /// schedule past the last application.
    pub fn new(days: i64) -> Option<Self> {
        (days >= 1).then_some(Self(days))
    }

    /// Parse and validate in one step.
    pub fn from_spec(spec: Option<&FrequencySpec>) -> Option<Self> {
        let days = parse_frequency(spec);
        let validated = Self::new(days);
        if validated.is_none() {
            tracing::debug!(days, "ignoring non-positive spray frequency");
        }
        validated
    }

    pub fn get(self) -> i64 {
        self.0
    }
}
