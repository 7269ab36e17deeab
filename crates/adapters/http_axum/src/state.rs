//! Shared application state for axum handlers.

use std::sync::Arc;

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};
use farmhub_app::services::alert_service::AlertService;
use farmhub_app::services::device_service::DeviceService;
use farmhub_app::services::rule_service::RuleService;
use farmhub_app::services::telemetry_service::TelemetryService;
use farmhub_domain::id::DeviceId;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do
/// not need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<RR, DS, TS, AR, EP, SS> {
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<RR>>,
    /// Device state machine service.
    pub device_service: Arc<DeviceService<DS, EP>>,
    /// Telemetry ingestion service (owns the rule engine).
    pub telemetry_service: Arc<TelemetryService<TS, RR, DS, AR, EP>>,
    /// Alert log service.
    pub alert_service: Arc<AlertService<AR>>,
    /// Receives stop commitments emitted by evaluation cycles.
    pub stop_scheduler: Arc<SS>,
    /// Device id assumed when a request names none.
    pub default_device_id: DeviceId,
}

impl<RR, DS, TS, AR, EP, SS> Clone for AppState<RR, DS, TS, AR, EP, SS> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            device_service: Arc::clone(&self.device_service),
            telemetry_service: Arc::clone(&self.telemetry_service),
            alert_service: Arc::clone(&self.alert_service),
            stop_scheduler: Arc::clone(&self.stop_scheduler),
            default_device_id: self.default_device_id.clone(),
        }
    }
}

impl<RR, DS, TS, AR, EP, SS> AppState<RR, DS, TS, AR, EP, SS>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        rule_service: RuleService<RR>,
        device_service: DeviceService<DS, EP>,
        telemetry_service: TelemetryService<TS, RR, DS, AR, EP>,
        alert_service: AlertService<AR>,
        stop_scheduler: SS,
        default_device_id: DeviceId,
    ) -> Self {
        Self {
            rule_service: Arc::new(rule_service),
            device_service: Arc::new(device_service),
            telemetry_service: Arc::new(telemetry_service),
            alert_service: Arc::new(alert_service),
            stop_scheduler: Arc::new(stop_scheduler),
            default_device_id,
        }
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        rule_service: Arc<RuleService<RR>>,
        device_service: Arc<DeviceService<DS, EP>>,
        telemetry_service: Arc<TelemetryService<TS, RR, DS, AR, EP>>,
        alert_service: Arc<AlertService<AR>>,
        stop_scheduler: Arc<SS>,
        default_device_id: DeviceId,
    ) -> Self {
        Self {
            rule_service,
            device_service,
            telemetry_service,
            alert_service,
            stop_scheduler,
            default_device_id,
        }
    }

    /// Resolve an optional request-supplied device id.
    #[must_use]
    pub fn device_id_or_default(&self, requested: Option<String>) -> DeviceId {
        requested.map_or_else(|| self.default_device_id.clone(), DeviceId::new)
    }
}
