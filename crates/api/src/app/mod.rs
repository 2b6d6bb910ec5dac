//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (stores, transfer engine)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use stockflow_auth::{Hs256TokenAuthority, TokenAuthority};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Session tokens live for seven days.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let tokens: Arc<dyn TokenAuthority> =
        Arc::new(Hs256TokenAuthority::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        tokens: Arc::clone(&tokens),
    };

    let services = Arc::new(services::build_services().await);

    // Everything except /health and /auth/* requires a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router())
        .merge(protected)
        .layer(Extension(services))
        .layer(Extension(tokens))
}
