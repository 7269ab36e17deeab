//! Action — the effect performed when a rule matches.

use serde::{Deserialize, Serialize};

use crate::alert::Severity;

/// The effect a matched rule asks the dispatcher to perform.
///
/// A closed tagged enum, validated at rule-creation time — there is no
/// stringly-typed action handling. Stored rules whose tag is not
/// recognised (written by an older or newer schema) deserialize to
/// [`Unknown`](Self::Unknown) and are logged no-ops at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Turn the irrigation pump on.
    StartIrrigation,
    /// Turn the irrigation pump off.
    StopIrrigation,
    /// Append an [`AlertRecord`](crate::alert::AlertRecord).
    RaiseAlert {
        severity: Severity,
        /// Optional operator-supplied message; a default is derived from
        /// the rule condition when absent.
        #[serde(default)]
        message: Option<String>,
    },
    /// Catch-all for unrecognised stored tags. Never dispatched.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartIrrigation => f.write_str("start_irrigation"),
            Self::StopIrrigation => f.write_str("stop_irrigation"),
            Self::RaiseAlert { severity, .. } => write!(f, "raise_alert({severity})"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
