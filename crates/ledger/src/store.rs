//! Repository contract over the durable store.
//!
//! The engine depends on this port, not on a specific database product.
//! Implementations live in `ledgerbank-infra` (in-memory for tests/dev,
//! Postgres for production).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use ledgerbank_banking::{Account, Client, TaxId, Transaction, TransactionKind};
use ledgerbank_core::{AccountId, ClientId, Money};

/// Store operation error.
///
/// These are storage-layer outcomes, as opposed to business-rule failures:
/// the engine maps them into its own taxonomy at the boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (tax id, account number).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store refused a balance decrement that would go negative.
    ///
    /// This is the store-level conditional update: even if a caller bypassed
    /// the engine's serialization, the balance invariant holds.
    #[error("insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: Money, requested: Money },

    /// The backend is unavailable or failed mid-operation. The contract
    /// guarantees no partial write occurred.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Typed read/write access to client, account and transaction records.
///
/// ## Implementation requirements
///
/// - Uniqueness: reject duplicate tax ids and duplicate account numbers with
///   [`StoreError::Conflict`].
/// - Referential integrity: every account references an existing client,
///   every transaction an existing account.
/// - Atomicity: [`LedgerStore::append_transaction`] persists the balance
///   write and the transaction insert as a single unit — both or neither.
/// - Ordering: per-account `sequence` numbers are 1-based and monotonically
///   increasing with no gaps; `posted_at` is clamped non-decreasing per
///   account so the statement order is stable under clock jitter.
/// - Snapshot reads: [`LedgerStore::transactions_for_account`] never observes
///   a half-committed append.
pub trait LedgerStore: Send + Sync {
    /// Persist a new client. Fails with [`StoreError::Conflict`] if the tax
    /// id is already registered.
    fn create_client(&self, client: Client) -> Result<Client, StoreError>;

    fn client_by_tax_id(&self, tax_id: &TaxId) -> Result<Option<Client>, StoreError>;

    /// Persist a new account. Fails with [`StoreError::Conflict`] if the
    /// account number is taken, [`StoreError::NotFound`] if the owning client
    /// is unknown.
    fn create_account(&self, account: Account) -> Result<Account, StoreError>;

    /// All accounts owned by a client, oldest first.
    fn accounts_for_client(&self, client_id: ClientId) -> Result<Vec<Account>, StoreError>;

    /// The client's oldest account, if any. Deposit, withdraw and statement
    /// address this account.
    fn primary_account_for_client(&self, client_id: ClientId)
        -> Result<Option<Account>, StoreError>;

    fn account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Atomically record a transaction and adjust the account balance.
    ///
    /// Assigns the per-account sequence number and clamps `posted_at` to be
    /// non-decreasing within the account. A withdrawal that would drive the
    /// balance negative fails with [`StoreError::InsufficientBalance`] and
    /// writes nothing.
    fn append_transaction(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
    ) -> Result<Transaction, StoreError>;

    /// The account's full ledger, in sequence order.
    fn transactions_for_account(&self, account_id: AccountId)
        -> Result<Vec<Transaction>, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn create_client(&self, client: Client) -> Result<Client, StoreError> {
        (**self).create_client(client)
    }

    fn client_by_tax_id(&self, tax_id: &TaxId) -> Result<Option<Client>, StoreError> {
        (**self).client_by_tax_id(tax_id)
    }

    fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        (**self).create_account(account)
    }

    fn accounts_for_client(&self, client_id: ClientId) -> Result<Vec<Account>, StoreError> {
        (**self).accounts_for_client(client_id)
    }

    fn primary_account_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Account>, StoreError> {
        (**self).primary_account_for_client(client_id)
    }

    fn account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).account(account_id)
    }

    fn append_transaction(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        (**self).append_transaction(account_id, kind, amount, posted_at)
    }

    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError> {
        (**self).transactions_for_account(account_id)
    }
}
