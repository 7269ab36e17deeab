//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod alert_repo;
pub mod device_store;
pub mod event_bus;
pub mod rule_repo;
pub mod scheduler;
pub mod telemetry_store;

pub use alert_repo::AlertRepository;
pub use device_store::DeviceStateStore;
pub use event_bus::EventPublisher;
pub use rule_repo::RuleRepository;
pub use scheduler::StopScheduler;
pub use telemetry_store::TelemetryStore;
