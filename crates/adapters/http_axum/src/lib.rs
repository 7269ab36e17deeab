//! # farmhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **REST JSON API** for programmatic access
//!   (`/api/rules`, `/api/telemetry`, `/api/device/...`, `/api/alerts`)
//! - Accept telemetry reports from irrigation nodes and answer their
//!   status polls
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `farmhub-app` (for port traits and services) and
//! `farmhub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
