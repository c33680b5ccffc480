//! Consistent JSON error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use ledgerbank_banking::{AccountNumber, TaxId};
use ledgerbank_core::Money;
use ledgerbank_ledger::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::InvalidAmount(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg),
        LedgerError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        LedgerError::ClientNotFound => {
            json_error(StatusCode::NOT_FOUND, "client_not_found", "client not found")
        }
        LedgerError::AccountNotFound => {
            json_error(StatusCode::NOT_FOUND, "account_not_found", "account not found")
        }
        LedgerError::InsufficientFunds { balance, requested } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_funds",
            format!("balance {balance}, requested {requested}"),
        ),
        LedgerError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
        LedgerError::Storage(e) => {
            // Opaque to the caller; the ledger guarantees no partial write.
            tracing::error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "storage failure")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_tax_id(raw: &str) -> Result<TaxId, axum::response::Response> {
    TaxId::new(raw)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}

pub fn parse_amount(raw: &str) -> Result<Money, axum::response::Response> {
    raw.parse::<Money>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_amount", e.to_string()))
}

pub fn parse_account_number(raw: i64) -> Result<AccountNumber, axum::response::Response> {
    AccountNumber::new(raw)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}
