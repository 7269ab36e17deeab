//! JSON REST handlers for telemetry ingestion and history.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};
use farmhub_domain::device::IrrigationCommand;
use farmhub_domain::id::RuleId;
use farmhub_domain::telemetry::TelemetrySample;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Request body an irrigation node posts with each sensor report.
#[derive(Deserialize)]
pub struct IngestRequest {
    pub device_id: Option<String>,
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light: Option<f64>,
    pub water_level: Option<f64>,
}

/// Query parameters for listing samples.
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// What one ingested sample set in motion.
#[derive(Serialize)]
pub struct IngestBody {
    pub sample: TelemetrySample,
    pub triggered: Vec<RuleId>,
    pub applied: Option<IrrigationCommand>,
    pub irrigation_on: bool,
    pub auto_mode: bool,
}

/// Possible responses from the ingest endpoint.
pub enum IngestResponse {
    Created(Json<IngestBody>),
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<TelemetrySample>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/telemetry` — ingest a sensor report and run one evaluation
/// cycle. Stop commitments the cycle emits are handed to the scheduler
/// before the response goes out.
pub async fn ingest<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Json(req): Json<IngestRequest>,
) -> Result<IngestResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let device_id = state.device_id_or_default(req.device_id);
    let sample = TelemetrySample {
        soil_moisture: req.soil_moisture,
        temperature: req.temperature,
        humidity: req.humidity,
        light: req.light,
        water_level: req.water_level,
        timestamp: farmhub_domain::time::now(),
    };

    let outcome = state
        .telemetry_service
        .record_sample(&device_id, sample.clone())
        .await?;

    for stop in outcome.scheduled_stops {
        state.stop_scheduler.schedule_stop(stop).await?;
    }

    Ok(IngestResponse::Created(Json(IngestBody {
        sample,
        triggered: outcome.triggered,
        applied: outcome.applied,
        irrigation_on: outcome.state.irrigation_on,
        auto_mode: outcome.state.auto_mode,
    })))
}

/// `GET /api/telemetry` — list recent samples, newest first.
pub async fn list<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let samples = state.telemetry_service.list_recent(limit).await?;
    Ok(ListResponse::Ok(Json(samples)))
}
