//! JSON REST handlers for device state and control.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};
use farmhub_domain::device::{DeviceState, IrrigationCommand};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters naming a device.
#[derive(Deserialize)]
pub struct DeviceQuery {
    pub device_id: Option<String>,
}

/// Request body for manual pump control.
#[derive(Deserialize)]
pub struct ControlRequest {
    pub device_id: Option<String>,
    pub command: IrrigationCommand,
}

/// Request body for switching between auto and manual mode.
#[derive(Deserialize)]
pub struct ModeRequest {
    pub device_id: Option<String>,
    pub auto: bool,
}

/// Possible responses from endpoints returning one device.
pub enum StateResponse {
    Ok(Json<DeviceState>),
}

impl IntoResponse for StateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<DeviceState>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/device/status` — the status poll irrigation nodes issue.
///
/// Creates a default record on first contact so a node can poll before
/// it ever reports telemetry.
pub async fn status<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Query(query): Query<DeviceQuery>,
) -> Result<StateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let device_id = state.device_id_or_default(query.device_id);
    let device = state.device_service.get_or_create(&device_id).await?;
    Ok(StateResponse::Ok(Json(device)))
}

/// `GET /api/devices` — list all known devices.
pub async fn list<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let devices = state.device_service.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `POST /api/device/control` — operator pump command.
///
/// Answers `409 Conflict` while the device is in auto mode; the rule
/// engine owns the pump there.
pub async fn control<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Json(req): Json<ControlRequest>,
) -> Result<StateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let device_id = state.device_id_or_default(req.device_id);
    let device = state
        .device_service
        .manual_control(&device_id, req.command)
        .await?;
    Ok(StateResponse::Ok(Json(device)))
}

/// `POST /api/device/mode` — switch between auto and manual mode.
pub async fn mode<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Json(req): Json<ModeRequest>,
) -> Result<StateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let device_id = state.device_id_or_default(req.device_id);
    let device = state
        .device_service
        .set_auto_mode(&device_id, req.auto)
        .await?;
    Ok(StateResponse::Ok(Json(device)))
}
