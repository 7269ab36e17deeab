//! # farmhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository` — CRUD for rules
//!   - `DeviceStateStore` — keyed device-state entries with compare-and-set saves
//!   - `AlertRepository` — append-only alert sink
//!   - `TelemetryStore` — append & query telemetry samples
//!   - `StopScheduler` — timer commitments for duration-based auto-stop
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RuleService` — create, update, list, delete rules
//!   - `DeviceService` — status, manual control, mode switching
//!   - `TelemetryService` — ingest a sample and run the evaluation cycle
//!   - `AlertService` — list alerts, mark viewed
//! - House the **rule engine**: matcher orchestration + action dispatch
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `farmhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod rule_engine;
pub mod services;
