//! Operator — the threshold comparison at the heart of a rule.

use serde::{Deserialize, Serialize};

/// The closed set of comparison operators a rule condition may use.
///
/// Wire form is the comparison token itself (`"<"`, `">="`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Operator {
    /// Compare a telemetry value against a threshold.
    ///
    /// Pure and total over IEEE-754 doubles. `Equal`/`NotEqual` use exact
    /// equality with no epsilon — a known precision caveat for values
    /// produced by floating-point arithmetic.
    #[must_use]
    pub fn evaluate(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::LessThan => value < threshold,
            Self::GreaterThan => value > threshold,
            Self::Equal => value == threshold,
            Self::LessOrEqual => value <= threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::NotEqual => value != threshold,
        }
    }

    /// The comparison token, as stored and shown to operators.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Equal => "=",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
            Self::NotEqual => "!=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Self::LessThan),
            ">" => Ok(Self::GreaterThan),
            "=" => Ok(Self::Equal),
            "<=" => Ok(Self::LessOrEqual),
            ">=" => Ok(Self::GreaterOrEqual),
            "!=" => Ok(Self::NotEqual),
            other => Err(ParseOperatorError {
                token: other.to_string(),
            }),
        }
    }
}

/// A string did not name a known comparison operator.
#[derive(Debug, thiserror::Error)]
#[error("unknown operator `{token}`")]
pub struct ParseOperatorError {
    /// The rejected token.
    pub token: String,
}
