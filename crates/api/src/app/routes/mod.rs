use axum::{routing::get, Router};

pub mod accounts;
pub mod auth;
pub mod clients;
pub mod common;
pub mod system;
pub mod transactions;

/// Protected routes (require a bearer token).
pub fn router() -> Router {
    Router::new()
        .nest("/clients", clients::router())
        .nest("/accounts", accounts::router())
        .merge(transactions::router())
        .route("/me", get(auth::me))
}
