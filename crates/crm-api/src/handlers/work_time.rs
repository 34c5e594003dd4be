//! Work-time API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use crm_core::traits::Id;
use crm_models::work_time::WorkTimeEventType;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{Actor, AppState};

#[derive(Debug, Deserialize)]
pub struct RecordEventDto {
    pub event_type: WorkTimeEventType,
    /// Defaults to the time the request is handled
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub as_of: Option<DateTime<Utc>>,
}

/// POST /api/work-time/events
pub async fn record_event(
    State(state): State<AppState>,
    actor: Actor,
    Json(dto): Json<RecordEventDto>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .services
        .work_time
        .record(actor.user(), dto.event_type, dto.occurred_at)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/work-time/members/:user_id
pub async fn member_summary(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Id>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<impl IntoResponse> {
    let summary = state
        .services
        .work_time
        .summary(actor.user(), user_id, params.as_of)
        .await?;
    Ok(Json(summary))
}
