use crate::config::Config;
use crate::db_storage::LeadStorage;
use crate::errors::AppError;
use crate::lead_models::{
    CreateLeadRequest, LeadListResponse, LeadResponse, ListLeadsParams, UpdateLeadRequest,
};
use crate::services::LeadService;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lead operations over the configured store.
    pub leads: LeadService,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn LeadStorage>) -> Self {
        Self {
            leads: LeadService::new(storage),
            config,
        }
    }
}

/// Liveness payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub details: String,
}

/// GET /api/v1/health
///
/// Static liveness check for external orchestration. Touches no state.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "leadlab-api".to_string(),
        details: "base app is up".to_string(),
    })
}

/// POST /api/v1/leads
///
/// Creates a lead. Returns 201 with the stored record, or 422 if the body fails validation
/// (in which case nothing is written).
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateLeadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    let Json(payload) = payload?;
    let new_lead = payload.validate()?;

    let lead = state.leads.create(new_lead).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/v1/leads?skip=&limit=
///
/// Returns a page of leads in id order plus the total number of leads.
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "leads",
    params(ListLeadsParams),
    responses(
        (status = 200, description = "Page of leads", body = LeadListResponse),
        (status = 422, description = "Invalid skip or limit")
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListLeadsParams>, QueryRejection>,
) -> Result<Json<LeadListResponse>, AppError> {
    let Query(params) = params?;

    let page = state.leads.list(params.skip, params.limit).await?;

    Ok(Json(page))
}

/// GET /api/v1/leads/{id}
#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    responses(
        (status = 200, description = "The lead", body = LeadResponse),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LeadResponse>, AppError> {
    let Path(id) = id?;

    let lead = state.leads.get(id).await?;

    Ok(Json(lead))
}

/// PUT/PATCH /api/v1/leads/{id}
///
/// Both verbs merge only the fields present in the body; omitted fields keep their values.
#[utoipa::path(
    patch,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Updated lead", body = LeadResponse),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateLeadRequest>, JsonRejection>,
) -> Result<Json<LeadResponse>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let lead = state.leads.update(id, changes).await?;

    Ok(Json(lead))
}

/// Same handler as [`update_lead`], documented under PUT.
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Updated lead", body = LeadResponse),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn replace_lead(
    state: State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateLeadRequest>, JsonRejection>,
) -> Result<Json<LeadResponse>, AppError> {
    update_lead(state, id, payload).await
}

/// DELETE /api/v1/leads/{id}
///
/// Physically removes the lead. 204 with an empty body on success.
#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    tag = "leads",
    params(("id" = i64, Path, description = "Lead identifier")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;

    state.leads.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
