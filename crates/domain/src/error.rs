//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FarmHubError`] via `#[from]`. No error here is fatal to the process;
//! all are scoped to a single evaluation cycle or command.

use crate::id::DeviceId;

/// Top-level error for domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum FarmHubError {
    /// A rule or command failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced aggregate does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A manual irrigation command arrived while the device was in auto mode.
    #[error("manual override rejected")]
    ManualOverride(#[from] ManualOverrideRejected),

    /// A concurrent actuation write was detected. The only retryable error:
    /// callers re-run the whole evaluation cycle.
    #[error("state conflict")]
    StateConflict(#[from] StateConflictError),

    /// An error from the persistence adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations, raised at rule-creation time — never
/// during evaluation (a sample missing a field is a skip, not an error).
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The rule name is empty.
    #[error("rule name must not be empty")]
    EmptyName,

    /// The rule has no condition (field, operator and threshold).
    #[error("rule must specify a condition field, an operator and a threshold")]
    MissingCondition,

    /// The rule has no action.
    #[error("rule must specify an action")]
    MissingAction,

    /// The threshold is NaN or infinite.
    #[error("rule threshold must be a finite number")]
    NonFiniteThreshold,

    /// The action tag is not in the supported set. Stored rules with an
    /// unrecognised action deserialize to `RuleAction::Unknown` and are
    /// no-ops at dispatch time, but creating one is rejected up front.
    #[error("rule action is not in the supported set")]
    UnknownAction,

    /// A duration of zero minutes was supplied.
    #[error("rule duration must be at least one minute")]
    ZeroDuration,
}

/// A referenced aggregate was not found in storage.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// The aggregate kind, e.g. `"Rule"`.
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}

/// A manual irrigation command was received while `auto_mode` is on.
///
/// Surfaced to the caller, never retried; the device state is unchanged.
#[derive(Debug, thiserror::Error)]
#[error("device {device_id} is in auto mode; manual irrigation commands are rejected")]
pub struct ManualOverrideRejected {
    /// The device that rejected the command.
    pub device_id: DeviceId,
}

/// The device state changed underneath a compare-and-set write.
#[derive(Debug, thiserror::Error)]
#[error("concurrent update detected for device {device_id}")]
pub struct StateConflictError {
    /// The device whose write was lost.
    pub device_id: DeviceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_validation_error() {
        let err: FarmHubError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            FarmHubError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_format_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Rule",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Rule abc not found");
    }

    #[test]
    fn should_format_manual_override_with_device_id() {
        let err = ManualOverrideRejected {
            device_id: DeviceId::new("ESP32_MAIN"),
        };
        assert!(err.to_string().contains("ESP32_MAIN"));
    }

    #[test]
    fn should_wrap_state_conflict() {
        let err: FarmHubError = StateConflictError {
            device_id: DeviceId::new("ESP32_MAIN"),
        }
        .into();
        assert!(matches!(err, FarmHubError::StateConflict(_)));
    }
}
