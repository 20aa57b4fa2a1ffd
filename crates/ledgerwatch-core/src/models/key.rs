//! Monitored key models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric value reported for a key whose balance could not be determined
pub const UNDETERMINED_VALUE: f64 = -1.0;

/// Result of the latest lookup for a key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Not looked up yet
    #[default]
    Pending,
    /// The explorer page yielded exactly one balance
    Success {
        /// Extracted balance
        value: f64,
    },
    /// The explorer answered but the pattern matched zero or several times
    Undetermined {
        /// Number of pattern matches found in the page
        matches: usize,
    },
    /// Transport error or a non-200 response
    FetchFailed {
        /// Transport error text, or the status reason
        reason: String,
        /// HTTP status, 0 when no response was received
        status: u16,
    },
}

/// One monitored ledger address and its latest lookup outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Ledger address
    pub address: String,

    /// Display name
    pub name: String,

    /// Latest lookup outcome
    #[serde(default, skip_deserializing)]
    pub outcome: Outcome,

    /// When the lookup completed
    #[serde(default, skip_deserializing)]
    pub checked_at: Option<DateTime<Utc>>,
}

impl Key {
    /// Create a key template that has not been looked up
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            outcome: Outcome::Pending,
            checked_at: None,
        }
    }

    /// Numeric view of the outcome.
    ///
    /// Failed and pending lookups read as `0.0`, undetermined ones as
    /// [`UNDETERMINED_VALUE`].
    pub fn value(&self) -> f64 {
        match self.outcome {
            Outcome::Success { value } => value,
            Outcome::Undetermined { .. } => UNDETERMINED_VALUE,
            Outcome::Pending | Outcome::FetchFailed { .. } => 0.0,
        }
    }

    /// Whether the explorer answered with a readable page
    pub fn is_success(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Success { .. } | Outcome::Undetermined { .. }
        )
    }

    /// Whether a balance was actually read from the page
    pub fn is_determined(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Diagnostic for the outcome, empty when a balance was read
    pub fn error_message(&self) -> String {
        match &self.outcome {
            Outcome::Success { .. } => String::new(),
            Outcome::Pending => "not checked".to_string(),
            Outcome::Undetermined { matches } => {
                format!("{matches} regex captures found")
            }
            Outcome::FetchFailed { reason, status } => {
                format!("msg: {reason}, status code: {status}")
            }
        }
    }

    /// Record a completed lookup
    pub(crate) fn record(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        self.checked_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_key_defaults() {
        let key = Key::new("LTC1", "cold wallet");

        assert_eq!(key.value(), 0.0);
        assert!(!key.is_success());
        assert!(key.checked_at.is_none());
    }

    #[test]
    fn test_fetch_failure_message() {
        let mut key = Key::new("LTC1", "cold wallet");
        key.outcome = Outcome::FetchFailed {
            reason: "Internal Server Error".to_string(),
            status: 500,
        };

        assert!(!key.is_success());
        assert_eq!(key.value(), 0.0);
        assert_eq!(
            key.error_message(),
            "msg: Internal Server Error, status code: 500"
        );
    }

    #[test]
    fn test_undetermined_reads_as_sentinel() {
        let mut key = Key::new("LTC1", "cold wallet");
        key.record(Outcome::Undetermined { matches: 0 });

        assert!(key.is_success());
        assert!(!key.is_determined());
        assert_eq!(key.value(), UNDETERMINED_VALUE);
        assert!(key.checked_at.is_some());
    }

    #[test]
    fn test_config_cannot_inject_outcome() {
        let key: Key = serde_json::from_str(
            r#"{"address": "LTC1", "name": "hot", "outcome": {"kind": "success", "value": 9.0}}"#,
        )
        .unwrap();

        assert_eq!(key.outcome, Outcome::Pending);
    }

    #[test]
    fn test_failed_outcome_serializes_status() {
        let mut key = Key::new("LTC1", "cold wallet");
        key.outcome = Outcome::FetchFailed {
            reason: "Bad Gateway".to_string(),
            status: 502,
        };

        let json = serde_json::to_value(&key).unwrap();

        assert_eq!(json["outcome"]["kind"], "fetch_failed");
        assert_eq!(json["outcome"]["status"], 502);
        assert_eq!(json["outcome"]["reason"], "Bad Gateway");
    }
}
