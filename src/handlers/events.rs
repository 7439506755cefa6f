use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    auth::AuthUser,
    error::AppError,
    extract::Payload,
    models::event::{Event, EventInput, SharedEvent},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Path ids that cannot name any event are simply not found.
fn event_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("Event not found"))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Payload(input): Payload<EventInput>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.events.list(user.id()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.get(user.id(), event_id(&id)?).await?;
    Ok(Json(event))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Payload(body): Payload<serde_json::Value>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .events
        .update_json(user.id(), event_id(&id)?, body)
        .await?;
    Ok(Json(event))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.events.delete(user.id(), event_id(&id)?).await?;
    Ok(Json(DeleteResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// Unauthenticated: the share token alone grants read access.
pub async fn shared(
    State(state): State<AppState>,
    Path(share_token): Path<String>,
) -> Result<Json<SharedEvent>, AppError> {
    Ok(Json(state.events.get_by_share_token(&share_token).await?))
}
