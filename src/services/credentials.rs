use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    auth::password::{hash_password_blocking, verify_decoy_blocking, verify_password_blocking},
    error::AppError,
    models::user::{Credentials, User, UserSummary},
};

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(sqlx::FromRow)]
struct StoredCredentials {
    id: i64,
    email: String,
    password_hash: String,
}

/// Owns user records and the lifecycle of their password hashes.
#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn register(&self, credentials: Credentials) -> Result<UserSummary, AppError> {
        let (email, password) = required(credentials)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::Duplicate("Email already registered".to_string()));
        }

        let password_hash = hash_password_blocking(password).await?;
        let now = Utc::now();

        // The UNIQUE constraint still catches a registration racing this one.
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_insert(e, "Email already registered"))?;

        tracing::info!(user_id = id, "user registered");
        Ok(UserSummary { id, email })
    }

    /// Checks an email/password pair.
    ///
    /// Unknown email and wrong password fail with the same error, and both
    /// run one argon2 verification.
    pub async fn verify(&self, credentials: Credentials) -> Result<UserSummary, AppError> {
        let (email, password) = required(credentials)?;

        let stored = sqlx::query_as::<_, StoredCredentials>(
            "SELECT id, email, password_hash FROM users WHERE email = ?",
        )
        .bind(&email)
        .fetch_optional(&self.db)
        .await?;

        let Some(stored) = stored else {
            verify_decoy_blocking(password).await?;
            tracing::debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password_blocking(password, stored.password_hash).await? {
            tracing::debug!(user_id = stored.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(UserSummary {
            id: stored.id,
            email: stored.email,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

fn required(credentials: Credentials) -> Result<(String, String), AppError> {
    let email = credentials
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    let password = credentials.password.filter(|p| !p.is_empty());

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::validation("Please provide email and password")),
    }
}
