//! Engine-level error taxonomy.

use thiserror::Error;

use ledgerbank_core::{DomainError, Money};

use crate::store::StoreError;

/// Error returned by ledger engine operations.
///
/// Every precondition failure short-circuits before any write, so a caller
/// that receives any of these can assume no balance or transaction record was
/// touched. `InsufficientFunds` is distinct from generic validation so
/// callers can branch on it.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input (identifier, name, address, date).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Non-positive, malformed or out-of-range monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Duplicate client tax id or account number.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No client registered under the given tax id.
    #[error("client not found")]
    ClientNotFound,

    /// The client has no account to transact against.
    #[error("account not found")]
    AccountNotFound,

    /// Withdrawal larger than the current balance. No side effect occurred.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Money, requested: Money },

    /// The caller's principal is missing or inactive.
    #[error("unauthorized")]
    Unauthorized,

    /// Durable store failure. Opaque to callers; the ledger guarantees no
    /// partial balance/transaction write occurred.
    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::InvalidAmount(msg) => LedgerError::InvalidAmount(msg),
            DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::Conflict(msg) => LedgerError::Conflict(msg),
            DomainError::Unauthorized => LedgerError::Unauthorized,
            // Domain constructors signal not-found only for missing referents
            // the engine has already resolved; treat a late miss as storage.
            DomainError::NotFound => {
                LedgerError::Storage(StoreError::NotFound("referenced record".to_string()))
            }
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => LedgerError::Conflict(msg),
            StoreError::InsufficientBalance { balance, requested } => {
                LedgerError::InsufficientFunds { balance, requested }
            }
            // Clients and accounts are never deleted in scope, so a record
            // that vanishes between resolution and write is a storage anomaly.
            StoreError::NotFound(_) | StoreError::Backend(_) => LedgerError::Storage(value),
        }
    }
}
