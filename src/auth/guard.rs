//! The `AuthUser` extractor: the single choke point for protected routes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{error::AppError, models::user::User, AppState};

/// The authenticated caller, resolved from the bearer token to a live account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Auth("Not authorized, no token".to_string()))?;

        let user_id = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            e
        })?;

        let user = state
            .credentials
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id, "token refers to a missing user");
                AppError::Auth("User not found".to_string())
            })?;

        Ok(AuthUser(user))
    }
}

/// Extracts `<token>` from an `Authorization: Bearer <token>` header.
///
/// Anything other than exactly one scheme, one space and a non-empty token
/// yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
