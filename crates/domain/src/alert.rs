//! Alert — append-only record raised by rule evaluation.
//!
//! Alerts are created by the action dispatcher and never mutated
//! afterwards, except for the `viewed` flag an operator may set.

use serde::{Deserialize, Serialize};

use crate::id::AlertId;
use crate::time::Timestamp;

/// How urgent an alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(ParseSeverityError {
                token: other.to_string(),
            }),
        }
    }
}

/// A string did not name a known severity.
#[derive(Debug, thiserror::Error)]
#[error("unknown severity `{token}`")]
pub struct ParseSeverityError {
    /// The rejected token.
    pub token: String,
}

/// An alert raised when a rule with an alert action matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    /// Short category, usually the name of the rule that fired.
    pub kind: String,
    /// Human-readable description of what tripped.
    pub message: String,
    pub severity: Severity,
    /// The rule threshold that was crossed, when applicable.
    pub threshold: Option<f64>,
    pub timestamp: Timestamp,
    /// Set once by an operator; the only permitted mutation.
    pub viewed: bool,
}

impl AlertRecord {
    /// Create a fresh, unviewed alert stamped with the current time.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        threshold: Option<f64>,
    ) -> Self {
        Self {
            id: AlertId::new(),
            kind: kind.into(),
            message: message.into(),
            severity,
            threshold,
            timestamp: crate::time::now(),
            viewed: false,
        }
    }

    /// Mark the alert as seen by an operator.
    pub fn mark_viewed(&mut self) {
        self.viewed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn should_create_unviewed_alert() {
        let alert = AlertRecord::new("Low moisture", "soil_moisture below 20", Severity::High, Some(20.0));
        assert!(!alert.viewed);
        assert_eq!(alert.threshold, Some(20.0));
    }

    #[test]
    fn should_mark_alert_as_viewed() {
        let mut alert = AlertRecord::new("Low moisture", "msg", Severity::Low, None);
        alert.mark_viewed();
        assert!(alert.viewed);
    }

    #[test]
    fn should_order_severities_by_urgency() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn should_roundtrip_severity_through_display_and_from_str() {
        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            let parsed = Severity::from_str(&severity.to_string()).unwrap();
            assert_eq!(parsed, severity);
        }
    }

    #[test]
    fn should_roundtrip_alert_through_serde_json() {
        let alert = AlertRecord::new("Tank empty", "water_level below 10", Severity::Critical, Some(10.0));
        let json = serde_json::to_string(&alert).unwrap();
        let parsed: AlertRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, alert);
    }
}
