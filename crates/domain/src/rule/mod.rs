//! Rule — operator-defined condition → action pair for automation.
//!
//! A rule compares one telemetry attribute against a threshold and, when
//! the comparison holds, asks the dispatcher to perform its action. Rules
//! are evaluated only while `status == Active` and `mode == Auto`; a rule
//! in manual mode is inert configuration an operator can arm later.

mod action;
mod operator;

pub use action::RuleAction;
pub use operator::{Operator, ParseOperatorError};

use serde::{Deserialize, Serialize};

use crate::error::{FarmHubError, ValidationError};
use crate::id::RuleId;
use crate::telemetry::{TelemetryField, TelemetrySample};
use crate::time::Timestamp;

/// Whether the rule participates in automatic evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Evaluated against every incoming telemetry sample.
    Auto,
    /// Stored but never evaluated; the operator triggers effects by hand.
    Manual,
}

impl RuleMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for RuleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognised rule mode.
#[derive(Debug, thiserror::Error)]
#[error("unknown rule mode: {0:?}")]
pub struct ParseModeError(String);

/// Whether the rule is switched on at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl RuleStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognised rule status.
#[derive(Debug, thiserror::Error)]
#[error("unknown rule status: {0:?}")]
pub struct ParseStatusError(String);

/// A condition → action pair owned by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// The telemetry attribute the condition reads.
    pub field: TelemetryField,
    pub operator: Operator,
    pub threshold: f64,
    pub action: RuleAction,
    /// For a timed start: stop irrigation this many minutes after starting.
    pub duration_minutes: Option<u32>,
    pub mode: RuleMode,
    pub status: RuleStatus,
    pub last_triggered: Option<Timestamp>,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `threshold` is NaN or infinite ([`ValidationError::NonFiniteThreshold`])
    /// - `action` is the `Unknown` catch-all ([`ValidationError::UnknownAction`])
    /// - `duration_minutes` is zero ([`ValidationError::ZeroDuration`])
    pub fn validate(&self) -> Result<(), FarmHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.threshold.is_finite() {
            return Err(ValidationError::NonFiniteThreshold.into());
        }
        if self.action == RuleAction::Unknown {
            return Err(ValidationError::UnknownAction.into());
        }
        if self.duration_minutes == Some(0) {
            return Err(ValidationError::ZeroDuration.into());
        }
        Ok(())
    }

    /// Whether this rule takes part in automatic evaluation.
    #[must_use]
    pub fn is_automated(&self) -> bool {
        self.status == RuleStatus::Active && self.mode == RuleMode::Auto
    }

    /// Evaluate the condition against a sample.
    ///
    /// Returns `None` when the sample omits the rule's field — a skip,
    /// not an error; a node may legitimately lack a sensor.
    #[must_use]
    pub fn matches(&self, sample: &TelemetrySample) -> Option<bool> {
        sample
            .value_of(self.field)
            .map(|value| self.operator.evaluate(value, self.threshold))
    }
}

/// Select the rules an incoming sample trips.
///
/// Keeps rules that are active, automated, and whose condition field is
/// present on the sample and evaluates true. Input order is preserved:
/// there is no priority model, ties resolve by how the caller sorted the
/// rule list. Side-effect free.
#[must_use]
pub fn match_rules<'a>(sample: &TelemetrySample, rules: &'a [Rule]) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.is_automated())
        .filter(|rule| rule.matches(sample) == Some(true))
        .collect()
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    condition: Option<(TelemetryField, Operator, f64)>,
    action: Option<RuleAction>,
    duration_minutes: Option<u32>,
    mode: Option<RuleMode>,
    status: Option<RuleStatus>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The condition: `field operator threshold`.
    #[must_use]
    pub fn condition(mut self, field: TelemetryField, operator: Operator, threshold: f64) -> Self {
        self.condition = Some((field, operator, threshold));
        self
    }

    #[must_use]
    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: RuleMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn status(mut self, status: RuleStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// Mode defaults to `Manual` and status to `Active`, mirroring the
    /// stored-schema defaults: a freshly created rule does nothing until
    /// an operator arms it.
    ///
    /// # Errors
    ///
    /// Returns [`FarmHubError::Validation`] if the condition or action is
    /// missing, or if any [`Rule::validate`] invariant fails.
    pub fn build(self) -> Result<Rule, FarmHubError> {
        let (field, operator, threshold) =
            self.condition.ok_or(ValidationError::MissingCondition)?;
        let action = self.action.ok_or(ValidationError::MissingAction)?;
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            field,
            operator,
            threshold,
            action,
            duration_minutes: self.duration_minutes,
            mode: self.mode.unwrap_or(RuleMode::Manual),
            status: self.status.unwrap_or(RuleStatus::Active),
            last_triggered: None,
        };
        rule.validate()?;
        Ok(rule)
    }
}
