//! # farmhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `farmhub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `farmhub-app` (for port traits) and `farmhub-domain` (for domain
//! types). The `app` and `domain` crates must never reference this adapter.

pub mod alert_repo;
pub mod device_store;
pub mod error;
pub mod pool;
pub mod rule_repo;
pub mod telemetry_store;

pub use alert_repo::SqliteAlertRepository;
pub use device_store::SqliteDeviceStateStore;
pub use pool::{Config, Database};
pub use rule_repo::SqliteRuleRepository;
pub use telemetry_store::SqliteTelemetryStore;
