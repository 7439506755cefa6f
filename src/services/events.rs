//! Event CRUD with per-owner access control.
//!
//! Every owner-scoped operation looks the event up first and only then checks
//! ownership, so an unknown id is a 404 for everyone while a real id owned by
//! someone else is a 403.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::event::{Event, EventInput, SharedEvent, SharedEventRow},
    services::share_token,
};

const NOT_FOUND: &str = "Event not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    View,
    Update,
    Delete,
}

impl Access {
    fn verb(self) -> &'static str {
        match self {
            Access::View => "view",
            Access::Update => "update",
            Access::Delete => "delete",
        }
    }
}

#[derive(Clone)]
pub struct EventService {
    db: SqlitePool,
    share_tokens: fn() -> String,
}

impl EventService {
    pub fn new(db: SqlitePool) -> Self {
        Self::with_share_tokens(db, share_token::generate)
    }

    pub(crate) fn with_share_tokens(db: SqlitePool, share_tokens: fn() -> String) -> Self {
        Self { db, share_tokens }
    }

    pub async fn create(&self, owner_id: i64, input: EventInput) -> Result<Event, AppError> {
        let draft = input.into_new_event()?;
        let token = (self.share_tokens)();
        let now = Utc::now();

        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (user_id, title, date_time, location, description, share_token, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(owner_id)
        .bind(&draft.title)
        .bind(draft.date_time)
        .bind(&draft.location)
        .bind(&draft.description)
        .bind(&token)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_insert(e, "shareToken already exists"))?;

        tracing::info!(event_id = event.id, owner_id, "event created");
        Ok(event)
    }

    /// All of the owner's events, soonest first.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE user_id = ? ORDER BY date_time ASC, id ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(events)
    }

    pub async fn get(&self, owner_id: i64, event_id: i64) -> Result<Event, AppError> {
        self.owned(owner_id, event_id, Access::View).await
    }

    pub async fn update(
        &self,
        owner_id: i64,
        event_id: i64,
        changes: EventInput,
    ) -> Result<Event, AppError> {
        let current = self.owned(owner_id, event_id, Access::Update).await?;
        self.write_update(owner_id, current, changes).await
    }

    /// Like [`update`](Self::update), but the body is only interpreted once
    /// the caller is known to own the event.
    pub async fn update_json(
        &self,
        owner_id: i64,
        event_id: i64,
        body: serde_json::Value,
    ) -> Result<Event, AppError> {
        let current = self.owned(owner_id, event_id, Access::Update).await?;
        let changes = EventInput::from_json(body)?;
        self.write_update(owner_id, current, changes).await
    }

    async fn write_update(
        &self,
        owner_id: i64,
        current: Event,
        changes: EventInput,
    ) -> Result<Event, AppError> {
        let event_id = current.id;
        let next = changes.apply_to(&current)?;

        // Last write wins: concurrent updates are not serialized beyond SQLite's own locking.
        let event = sqlx::query_as::<_, Event>(
            "UPDATE events SET title = ?, date_time = ?, location = ?, description = ?, updated_at = ? \
             WHERE id = ? RETURNING *",
        )
        .bind(&next.title)
        .bind(next.date_time)
        .bind(&next.location)
        .bind(&next.description)
        .bind(Utc::now())
        .bind(event_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        tracing::debug!(event_id, owner_id, "event updated");
        Ok(event)
    }

    pub async fn delete(&self, owner_id: i64, event_id: i64) -> Result<(), AppError> {
        self.owned(owner_id, event_id, Access::Delete).await?;

        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(&self.db)
            .await?;

        tracing::info!(event_id, owner_id, "event deleted");
        Ok(())
    }

    /// Public read path: anyone holding the exact token may read the event.
    pub async fn get_by_share_token(&self, token: &str) -> Result<SharedEvent, AppError> {
        let row = sqlx::query_as::<_, SharedEventRow>(
            "SELECT e.*, u.email AS owner_email FROM events e \
             JOIN users u ON u.id = e.user_id WHERE e.share_token = ?",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        Ok(row.into())
    }

    async fn owned(&self, owner_id: i64, event_id: i64, access: Access) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

        if event.owner != owner_id {
            tracing::debug!(event_id, owner_id, ?access, "ownership check failed");
            return Err(AppError::forbidden(format!(
                "Not authorized to {} this event",
                access.verb()
            )));
        }

        Ok(event)
    }
}
