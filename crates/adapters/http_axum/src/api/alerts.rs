//! JSON REST handlers for the alert log.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};
use farmhub_domain::alert::AlertRecord;
use farmhub_domain::id::AlertId;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_ALERT_LIMIT: usize = 50;

/// Query parameters for listing alerts.
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AlertRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the mark-viewed endpoint.
pub enum ViewedResponse {
    Ok(Json<AlertRecord>),
}

impl IntoResponse for ViewedResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/alerts` — list recent alerts, newest first.
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
    let limit = query.limit.unwrap_or(DEFAULT_ALERT_LIMIT);
    let alerts = state.alert_service.list_recent(limit).await?;
    Ok(ListResponse::Ok(Json(alerts)))
}

/// `POST /api/alerts/:id/viewed` — mark an alert as seen.
pub async fn mark_viewed<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Path(id): Path<String>,
) -> Result<ViewedResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let alert_id =
        AlertId::from_str(&id).map_err(|_| ApiError::BadRequest(format!("invalid alert id: {id}")))?;
    let alert = state.alert_service.mark_viewed(alert_id).await?;
    Ok(ViewedResponse::Ok(Json(alert)))
}
