//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::{body::Body, http::Request, http::StatusCode, Router};
use serde_json::Value;
use tower::ServiceExt;

use event_tracker::{auth::TokenIssuer, config::TokenConfig, db, rest, AppState};

pub const SECRET: &str = "integration-test-secret";

/// Test application context
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_ttl(chrono::Duration::days(7)).await
    }

    pub async fn with_ttl(ttl: chrono::Duration) -> Self {
        let pool = db::in_memory().await.expect("Failed to open test database");
        let tokens = TokenIssuer::new(&TokenConfig {
            secret: SECRET.to_string(),
            ttl,
        });
        let state = AppState::new(pool, tokens);

        Self {
            router: rest::app(state.clone(), std::time::Duration::from_secs(30)),
            state,
        }
    }

    /// Sends a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Registers a user and returns its token and id.
    pub async fn register(&self, email: &str, password: &str) -> (String, i64) {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        (
            response.body["token"].as_str().unwrap().to_string(),
            response.body["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Creates an event owned by the token holder and returns the JSON record.
    pub async fn create_event(&self, token: &str, title: &str, date_time: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/events",
                Some(serde_json::json!({
                    "title": title,
                    "dateTime": date_time,
                    "location": "Room 1",
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}
