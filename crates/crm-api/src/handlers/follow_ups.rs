//! Follow-up API handlers for leads and clients

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crm_core::traits::Id;
use crm_models::follow_up::{FollowUpForm, FollowUpSubject};
use crm_services::SubjectKind;

use crate::error::ApiResult;
use crate::extractors::{Actor, AppState};

/// GET /api/leads/:id/follow-ups
pub async fn list_lead_follow_ups(
    State(state): State<AppState>,
    actor: Actor,
    Path(lead_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let follow_ups = state
        .services
        .follow_ups
        .list(actor.user(), FollowUpSubject::Lead(lead_id))
        .await?;
    Ok(Json(follow_ups))
}

/// POST /api/leads/:id/follow-ups
pub async fn create_lead_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(lead_id): Path<Id>,
    Json(form): Json<FollowUpForm>,
) -> ApiResult<impl IntoResponse> {
    let follow_up = state
        .services
        .follow_ups
        .create(actor.user(), FollowUpSubject::Lead(lead_id), form)
        .await?;
    Ok((StatusCode::CREATED, Json(follow_up)))
}

/// GET /api/clients/:id/follow-ups
pub async fn list_client_follow_ups(
    State(state): State<AppState>,
    actor: Actor,
    Path(client_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let follow_ups = state
        .services
        .follow_ups
        .list(actor.user(), FollowUpSubject::Client(client_id))
        .await?;
    Ok(Json(follow_ups))
}

/// GET /api/clients/:id/lead-follow-ups
///
/// History recorded on the lead the client was converted from.
pub async fn list_client_lead_follow_ups(
    State(state): State<AppState>,
    actor: Actor,
    Path(client_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let follow_ups = state
        .services
        .follow_ups
        .list_for_client_lead(actor.user(), client_id)
        .await?;
    Ok(Json(follow_ups))
}

/// POST /api/clients/:id/follow-ups
pub async fn create_client_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(client_id): Path<Id>,
    Json(form): Json<FollowUpForm>,
) -> ApiResult<impl IntoResponse> {
    let follow_up = state
        .services
        .follow_ups
        .create(actor.user(), FollowUpSubject::Client(client_id), form)
        .await?;
    Ok((StatusCode::CREATED, Json(follow_up)))
}

/// PUT /api/lead-follow-ups/:id
pub async fn update_lead_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(form): Json<FollowUpForm>,
) -> ApiResult<impl IntoResponse> {
    update(state, actor, SubjectKind::Lead, id, form).await
}

/// DELETE /api/lead-follow-ups/:id
pub async fn delete_lead_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    delete(state, actor, SubjectKind::Lead, id).await
}

/// PUT /api/client-follow-ups/:id
pub async fn update_client_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(form): Json<FollowUpForm>,
) -> ApiResult<impl IntoResponse> {
    update(state, actor, SubjectKind::Client, id, form).await
}

/// DELETE /api/client-follow-ups/:id
pub async fn delete_client_follow_up(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    delete(state, actor, SubjectKind::Client, id).await
}

async fn update(
    state: AppState,
    actor: Actor,
    kind: SubjectKind,
    id: Id,
    form: FollowUpForm,
) -> ApiResult<impl IntoResponse> {
    let follow_up = state
        .services
        .follow_ups
        .update(actor.user(), kind, id, form)
        .await?;
    Ok(Json(follow_up))
}

async fn delete(
    state: AppState,
    actor: Actor,
    kind: SubjectKind,
    id: Id,
) -> ApiResult<impl IntoResponse> {
    state.services.follow_ups.delete(actor.user(), kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
