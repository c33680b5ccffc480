use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use ledgerbank_banking::TransactionKind;

use crate::app::routes::common::run_blocking;
use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/deposits", post(deposit))
        .route("/withdrawals", post(withdraw))
        .route("/statements/:tax_id", get(statement))
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    movement(services, ctx, body, TransactionKind::Deposit).await
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::MovementRequest>,
) -> axum::response::Response {
    movement(services, ctx, body, TransactionKind::Withdrawal).await
}

async fn movement(
    services: Arc<AppServices>,
    ctx: PrincipalContext,
    body: dto::MovementRequest,
    kind: TransactionKind,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&body.tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };
    let amount = match errors::parse_amount(&body.amount) {
        Ok(amount) => amount,
        Err(resp) => return resp,
    };

    let result = run_blocking(move || match kind {
        TransactionKind::Deposit => services.engine.deposit(ctx.principal(), &tax_id, amount),
        TransactionKind::Withdrawal => services.engine.withdraw(ctx.principal(), &tax_id, amount),
    })
    .await;

    match result {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(dto::transaction_to_response(&transaction)),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn statement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(tax_id): Path<String>,
) -> axum::response::Response {
    let tax_id = match errors::parse_tax_id(&tax_id) {
        Ok(tax_id) => tax_id,
        Err(resp) => return resp,
    };

    let result = run_blocking(move || services.engine.statement(ctx.principal(), &tax_id)).await;

    match result {
        Ok(entries) => {
            let items: Vec<_> = entries.iter().map(dto::transaction_to_response).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
