//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Mounts the JSON API under `/api` and a `/health` probe at the root.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<RR, DS, TS, AR, EP, SS>(state: AppState<RR, DS, TS, AR, EP, SS>) -> Router
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
