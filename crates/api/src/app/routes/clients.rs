use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use ledgerbank_banking::parse_birth_date;
use ledgerbank_ledger::NewClient;

use crate::app::routes::common::run_blocking;
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_client))
        .route("/:tax_id", get(get_client))
        .route("/:tax_id/accounts", get(list_accounts))
}

pub async fn register_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::RegisterClientRequest>,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&body.tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };
    let birth_date = match parse_birth_date(&body.birth_date) {
        Ok(date) => date,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
    };

    let new_client = NewClient {
        tax_id,
        name: body.name,
        birth_date,
        address: body.address,
    };

    let result = run_blocking(move || {
        services
            .engine
            .register_client(ctx.principal(), new_client)
    })
    .await;

    match result {
        Ok(client) => {
            (StatusCode::CREATED, Json(dto::client_to_response(&client))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(tax_id): Path<String>,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };

    let result =
        run_blocking(move || services.engine.client_by_tax_id(ctx.principal(), &tax_id)).await;

    match result {
        Ok(client) => (StatusCode::OK, Json(dto::client_to_response(&client))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(tax_id): Path<String>,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };

    let result =
        run_blocking(move || services.engine.accounts_for_client(ctx.principal(), &tax_id)).await;

    match result {
        Ok(accounts) => {
            let items: Vec<_> = accounts.iter().map(dto::account_to_response).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
