use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, events, health},
    AppState,
};

/// All routes, without middleware.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let event_routes = Router::new()
        .route("/", get(events::list).post(events::create))
        .route("/share/:share_token", get(events::shared))
        .route(
            "/:id",
            get(events::get).put(events::update).delete(events::delete),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/events", event_routes)
        .route("/api/health", get(health::health))
        .with_state(state)
}

/// The served application: routes plus tracing, CORS and a per-request deadline.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
