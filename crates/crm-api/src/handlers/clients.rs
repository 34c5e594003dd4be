//! Client API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crm_core::traits::Id;
use crm_models::client::ClientForm;
use crm_services::ClientListParams;

use crate::error::ApiResult;
use crate::extractors::{Actor, AppState};

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ClientListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = state.services.clients.list_page(actor.user(), params).await?;
    Ok(Json(page))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    actor: Actor,
    Json(form): Json<ClientForm>,
) -> ApiResult<impl IntoResponse> {
    let client = state.services.clients.create(actor.user(), form).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let client = state.services.clients.get(actor.user(), id).await?;
    Ok(Json(client))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(form): Json<ClientForm>,
) -> ApiResult<impl IntoResponse> {
    let client = state.services.clients.update(actor.user(), id, form).await?;
    Ok(Json(client))
}

/// DELETE /api/clients/:id
pub async fn delete_client(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.services.clients.delete(actor.user(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
