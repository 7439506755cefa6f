//! Integration tests for registration, login and the bearer-token guard.

mod helpers;

use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn register_returns_token_and_public_user() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(response.body["user"]["email"], "a@x.com");
    let user = response.body["user"].as_object().unwrap();
    assert_eq!(user.len(), 2);
    assert!(!response.body.to_string().contains("secret1"));
    assert!(!response.body.to_string().contains("argon2"));
}

#[tokio::test]
async fn register_twice_is_a_bad_request() {
    let app = TestApp::new().await;
    app.register("a@x.com", "secret1").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Email already registered");
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::new().await;

    for body in [
        json!({ "email": "a@x.com" }),
        json!({ "password": "secret1" }),
        json!({ "email": "a@x.com", "password": "short" }),
    ] {
        let response = app
            .request("POST", "/api/auth/register", Some(body), None)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body["message"].is_string());
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn login_returns_token_for_the_same_user() {
    let app = TestApp::new().await;
    let (_, id) = app.register("a@x.com", "secret1").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["id"], id);
    assert_eq!(response.body["user"]["email"], "a@x.com");
    assert!(response.body["token"].is_string());
}

#[tokio::test]
async fn login_failures_do_not_reveal_which_part_was_wrong() {
    let app = TestApp::new().await;
    app.register("a@x.com", "secret1").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "secret2" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn me_returns_the_user_without_password() {
    let app = TestApp::new().await;
    let (token, id) = app.register("a@x.com", "secret1").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], id);
    assert_eq!(response.body["email"], "a@x.com");
    assert!(response.body.get("password").is_none());
    assert!(response.body.get("passwordHash").is_none());
}

#[tokio::test]
async fn missing_or_malformed_header_is_unauthorized() {
    let app = TestApp::new().await;
    let (token, _) = app.register("a@x.com", "secret1").await;

    let no_header = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(no_header.status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_header.body["message"], "Not authorized, no token");

    for value in [token.clone(), format!("Token {token}"), "Bearer ".to_string()] {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header("authorization", value)
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["message"], "Not authorized, no token");
    }
}

#[tokio::test]
async fn invalid_and_expired_tokens_are_distinguished() {
    let app = TestApp::new().await;
    let invalid = app
        .request("GET", "/api/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(invalid.status, StatusCode::UNAUTHORIZED);
    assert_eq!(invalid.body["message"], "Invalid token");

    let expiring = TestApp::with_ttl(chrono::Duration::seconds(-60)).await;
    let (stale, _) = expiring.register("a@x.com", "secret1").await;
    let expired = expiring
        .request("GET", "/api/auth/me", None, Some(&stale))
        .await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.body["message"], "Token expired");
}

#[tokio::test]
async fn token_of_a_deleted_user_is_rejected() {
    let app = TestApp::new().await;
    let (token, id) = app.register("a@x.com", "secret1").await;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&app.state.db)
        .await
        .unwrap();

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "User not found");
}

#[tokio::test]
async fn health_needs_no_auth() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "OK");
}
