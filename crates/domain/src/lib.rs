//! # farmhub-domain
//!
//! Pure domain model for the farmhub automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Telemetry samples** (one timestamped reading from the field sensors)
//! - Define **Rules** (operator-defined condition → action pairs)
//! - Define the **Device state machine** (irrigation on/off × auto/manual mode)
//! - Define **Alert records** (append-only, raised by rule evaluation)
//! - Define **Events** (in-process notifications of state changes)
//! - Contain all invariant enforcement and the pure evaluation logic
//!   (threshold comparison, rule matching)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod alert;
pub mod device;
pub mod event;
pub mod rule;
pub mod telemetry;
