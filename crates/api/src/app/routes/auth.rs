use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use ledgerbank_auth::TokenCodec;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// `POST /token` — verify credentials and issue a bearer token.
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TokenRequest>,
) -> axum::response::Response {
    let claims = match services
        .gateway
        .authenticate(&body.username, &body.password, Utc::now())
    {
        Ok(claims) => claims,
        Err(e) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", e.to_string())
        }
    };

    match services.codec.encode(&claims) {
        Ok(token) => (
            StatusCode::OK,
            Json(dto::TokenResponse {
                access_token: token,
                token_type: "bearer",
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "token encoding failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "token encoding failed",
            )
        }
    }
}

/// `GET /me` — echo the authenticated principal.
pub async fn me(Extension(ctx): Extension<PrincipalContext>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(dto::principal_to_response(ctx.principal())),
    )
        .into_response()
}
