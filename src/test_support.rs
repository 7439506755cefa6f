//! Fixtures shared by the unit tests.

use chrono::Utc;
use sqlx::SqlitePool;

pub(crate) async fn pool() -> SqlitePool {
    crate::db::in_memory()
        .await
        .expect("in-memory database should open and migrate")
}

/// Inserts a user directly, skipping password hashing.
pub(crate) async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
    let now = Utc::now();
    sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, created_at, updated_at) VALUES (?, 'unused', ?, ?) RETURNING id",
    )
    .bind(email)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .expect("user insert should succeed")
}
