//! Lead API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crm_core::traits::Id;
use crm_models::lead::LeadForm;
use crm_services::LeadListParams;

use crate::error::ApiResult;
use crate::extractors::{Actor, AppState};

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<LeadListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = state.services.leads.list_page(actor.user(), params).await?;
    Ok(Json(page))
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<AppState>,
    actor: Actor,
    Json(form): Json<LeadForm>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.services.leads.create(actor.user(), form).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.services.leads.get(actor.user(), id).await?;
    Ok(Json(lead))
}

/// PUT /api/leads/:id
pub async fn update_lead(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(form): Json<LeadForm>,
) -> ApiResult<impl IntoResponse> {
    let lead = state.services.leads.update(actor.user(), id, form).await?;
    Ok(Json(lead))
}

/// DELETE /api/leads/:id
pub async fn delete_lead(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.services.leads.delete(actor.user(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
