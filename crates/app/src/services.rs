//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod alert_service;
pub mod device_service;
pub mod rule_service;
pub mod telemetry_service;
