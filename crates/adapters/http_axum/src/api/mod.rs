//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod alerts;
#[allow(clippy::missing_errors_doc)]
pub mod device;
#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod telemetry;

use axum::Router;
use axum::routing::{get, post};

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<RR, DS, TS, AR, EP, SS>() -> Router<AppState<RR, DS, TS, AR, EP, SS>>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<RR, DS, TS, AR, EP, SS>)
                .post(rules::create::<RR, DS, TS, AR, EP, SS>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<RR, DS, TS, AR, EP, SS>)
                .put(rules::update::<RR, DS, TS, AR, EP, SS>)
                .delete(rules::delete::<RR, DS, TS, AR, EP, SS>),
        )
        // Telemetry
        .route(
            "/telemetry",
            get(telemetry::list::<RR, DS, TS, AR, EP, SS>)
                .post(telemetry::ingest::<RR, DS, TS, AR, EP, SS>),
        )
        // Devices
        .route("/devices", get(device::list::<RR, DS, TS, AR, EP, SS>))
        .route(
            "/device/status",
            get(device::status::<RR, DS, TS, AR, EP, SS>),
        )
        .route(
            "/device/control",
            post(device::control::<RR, DS, TS, AR, EP, SS>),
        )
        .route("/device/mode", post(device::mode::<RR, DS, TS, AR, EP, SS>))
        // Alerts
        .route("/alerts", get(alerts::list::<RR, DS, TS, AR, EP, SS>))
        .route(
            "/alerts/{id}/viewed",
            post(alerts::mark_viewed::<RR, DS, TS, AR, EP, SS>),
        )
}
