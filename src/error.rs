use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Auth(String),
    #[error("Invalid token")]
    TokenInvalid,
    #[error("Token expired")]
    TokenExpired,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("password hashing error: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("token error: {0}")]
    Jwt(jsonwebtoken::errors::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Maps a failed insert to `Duplicate` when a unique constraint rejected it.
    pub fn on_insert(err: sqlx::Error, duplicate_message: &str) -> Self {
        if is_unique_violation(&err) {
            return AppError::Duplicate(duplicate_message.to_string());
        }
        AppError::Sqlx(err)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::Auth(_)
            | AppError::TokenInvalid
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Sqlx(_)
            | AppError::PasswordHash(_)
            | AppError::Jwt(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

impl From<sqlx::Error> for AppError {
    fn from(inner: sqlx::Error) -> Self {
        if is_unique_violation(&inner) {
            return AppError::Duplicate("Resource already exists".to_string());
        }
        AppError::Sqlx(inner)
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(inner)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(inner: jsonwebtoken::errors::Error) -> Self {
        AppError::Jwt(inner)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(inner: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {inner}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Details stay in the log; clients only ever see a generic message.
            tracing::error!(error = %self, "request failed");
            "Server Error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}
