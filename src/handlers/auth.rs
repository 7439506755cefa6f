use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::AuthUser,
    error::AppError,
    extract::Payload,
    models::user::{AuthResponse, Credentials, User},
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Payload(credentials): Payload<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user = state.credentials.register(credentials).await?;
    let token = state.tokens.issue(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Payload(credentials): Payload<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state.credentials.verify(credentials).await?;
    let token = state.tokens.issue(user.id)?;

    tracing::info!(user_id = user.id, "login successful");
    Ok(Json(AuthResponse { token, user }))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
