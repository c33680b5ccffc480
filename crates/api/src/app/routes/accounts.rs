use std::sync::Arc;

use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};

use ledgerbank_core::Money;

use crate::app::routes::common::run_blocking;
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(open_account))
}

pub async fn open_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::OpenAccountRequest>,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&body.tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };
    let number = match errors::parse_account_number(body.number) {
        Ok(number) => number,
        Err(resp) => return resp,
    };
    let initial_balance = match body.initial_balance.as_deref() {
        Some(raw) => match errors::parse_amount(raw) {
            Ok(amount) => amount,
            Err(resp) => return resp,
        },
        None => Money::ZERO,
    };

    let result = run_blocking(move || {
        services
            .engine
            .open_account(ctx.principal(), &tax_id, number, initial_balance)
    })
    .await;

    match result {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_response(&account))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
