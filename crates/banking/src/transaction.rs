//! Ledger transactions (append-only audit trail).

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerbank_core::{AccountId, DomainError, DomainResult, Entity, Money, TransactionId};

/// Kind of monetary movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }

    /// Effect of a movement of `amount` on a balance, in signed minor units.
    pub fn signed_minor_units(self, amount: Money) -> i64 {
        match self {
            TransactionKind::Deposit => amount.minor_units(),
            TransactionKind::Withdrawal => -amount.minor_units(),
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(DomainError::validation(format!(
                "unknown transaction kind: {other:?}"
            ))),
        }
    }
}

/// One immutable entry in an account's ledger.
///
/// Transactions are never updated or deleted. `sequence` is assigned by the
/// store, 1-based and monotonically increasing per account; it is the
/// insertion-order tie-break when two entries share a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub posted_at: DateTime<Utc>,
    pub sequence: u64,
}

impl Transaction {
    /// Build a ledger entry, rejecting non-positive amounts.
    pub fn record(
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
        sequence: u64,
    ) -> DomainResult<Self> {
        if !amount.is_positive() {
            return Err(DomainError::invalid_amount(
                "transaction amount must be greater than zero",
            ));
        }
        Ok(Self {
            id: TransactionId::new(),
            account_id,
            kind,
            amount,
            posted_at,
            sequence,
        })
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
