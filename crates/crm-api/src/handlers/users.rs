//! User administration API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crm_core::traits::Id;
use crm_models::user::{NewUserAccount, UserAccountUpdate};
use crm_services::UserListParams;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{Actor, AppState, AuthenticatedUser};

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<UserListParams>,
) -> ApiResult<impl IntoResponse> {
    let users = state.services.users.list(actor.user(), params).await?;
    Ok(Json(users))
}

/// GET /api/users/me
pub async fn current_user(user: AuthenticatedUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(user.0))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<NewUserAccount>,
) -> ApiResult<impl IntoResponse> {
    let user = state.services.users.create(actor.user(), input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let user = state.services.users.get(actor.user(), id).await?;
    Ok(Json(user))
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(update): Json<UserAccountUpdate>,
) -> ApiResult<impl IntoResponse> {
    let user = state.services.users.update(actor.user(), id, update).await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.services.users.delete(actor.user(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordDto {
    pub password: String,
}

/// PUT /api/users/:id/password
pub async fn change_password(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Id>,
    Json(dto): Json<ChangePasswordDto>,
) -> ApiResult<impl IntoResponse> {
    state
        .services
        .users
        .change_password(actor.user(), id, &dto.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
