pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod rest;
pub mod services;

#[cfg(test)]
mod test_support;

use sqlx::SqlitePool;

use crate::{
    auth::TokenIssuer,
    services::{CredentialStore, EventService},
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenIssuer,
    pub credentials: CredentialStore,
    pub events: EventService,
}

impl AppState {
    pub fn new(db: SqlitePool, tokens: TokenIssuer) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            events: EventService::new(db.clone()),
            db,
            tokens,
        }
    }
}
