//! JSON REST handlers for automation rules.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use farmhub_app::ports::{
    AlertRepository, DeviceStateStore, EventPublisher, RuleRepository, StopScheduler,
    TelemetryStore,
};
use farmhub_domain::id::RuleId;
use farmhub_domain::rule::{Operator, Rule, RuleAction, RuleMode, RuleStatus};
use farmhub_domain::telemetry::TelemetryField;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a rule.
#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    pub field: TelemetryField,
    pub operator: Operator,
    pub threshold: f64,
    pub action: RuleAction,
    pub duration_minutes: Option<u32>,
    pub mode: Option<RuleMode>,
    pub status: Option<RuleStatus>,
}

/// Request body for updating a rule.
#[derive(Deserialize)]
pub struct UpdateRuleRequest {
    pub name: String,
    pub field: TelemetryField,
    pub operator: Operator,
    pub threshold: f64,
    pub action: RuleAction,
    pub duration_minutes: Option<u32>,
    pub mode: RuleMode,
    pub status: RuleStatus,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Rule>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Rule>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Rule>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    RuleId::from_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid rule id: {raw}")))
}

/// `GET /api/rules` — list all rules.
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
    let rules = state.rule_service.list_rules().await?;
    Ok(ListResponse::Ok(Json(rules)))
}

/// `GET /api/rules/:id` — get rule by ID.
pub async fn get<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    let rule = state.rule_service.get_rule(rule_id).await?;
    Ok(GetResponse::Ok(Json(rule)))
}

/// `POST /api/rules` — create a new rule.
pub async fn create<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let mut builder = Rule::builder()
        .name(req.name)
        .condition(req.field, req.operator, req.threshold)
        .action(req.action);

    if let Some(minutes) = req.duration_minutes {
        builder = builder.duration_minutes(minutes);
    }
    if let Some(mode) = req.mode {
        builder = builder.mode(mode);
    }
    if let Some(status) = req.status {
        builder = builder.status(status);
    }

    let rule = builder.build()?;
    let created = state.rule_service.create_rule(rule).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/rules/:id` — update an existing rule.
pub async fn update<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;

    // Keep the stored last_triggered stamp across edits.
    let existing = state.rule_service.get_rule(rule_id).await?;

    let mut builder = Rule::builder()
        .id(rule_id)
        .name(req.name)
        .condition(req.field, req.operator, req.threshold)
        .action(req.action)
        .mode(req.mode)
        .status(req.status);

    if let Some(minutes) = req.duration_minutes {
        builder = builder.duration_minutes(minutes);
    }

    let mut rule = builder.build()?;
    rule.last_triggered = existing.last_triggered;
    let updated = state.rule_service.update_rule(rule).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/rules/:id` — delete a rule.
pub async fn delete<RR, DS, TS, AR, EP, SS>(
    State(state): State<AppState<RR, DS, TS, AR, EP, SS>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    DS: DeviceStateStore + Send + Sync + 'static,
    TS: TelemetryStore + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    SS: StopScheduler + Send + Sync + 'static,
{
    let rule_id = parse_rule_id(&id)?;
    state.rule_service.delete_rule(rule_id).await?;
    Ok(DeleteResponse::NoContent)
}
