//! HTTP API application wiring (axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (store, engine, auth gateway)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);

    let auth_state = middleware::AuthState {
        services: Arc::clone(&services),
    };

    // Protected routes: require a resolved principal.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/token", post(routes::auth::issue_token))
        .layer(Extension(services));

    Ok(Router::new().merge(public).merge(protected))
}
