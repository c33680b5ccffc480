//! Postgres-backed durable store.
//!
//! Uniqueness, referential integrity and the non-negative balance constraint
//! are enforced at the database level; `append_transaction` runs a single DB
//! transaction with a conditional balance update, so the balance write and
//! the transaction insert commit together or not at all.
//!
//! ## Error mapping
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `23505` unique violation | `Conflict` | duplicate tax id / account number / per-account sequence |
//! | `23503` foreign key violation | `NotFound` | referenced client/account missing |
//! | other | `Backend` | connectivity, pool closed, decode failures |
//!
//! The `LedgerStore` trait is synchronous; operations run on the ambient
//! tokio runtime via `Handle::block_on`, so callers must invoke the store
//! from a blocking context (e.g. `tokio::task::spawn_blocking`).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use ledgerbank_banking::{Account, AccountNumber, Client, TaxId, Transaction, TransactionKind};
use ledgerbank_core::{AccountId, ClientId, Money, TransactionId};
use ledgerbank_ledger::{LedgerStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS clients (
    id            UUID PRIMARY KEY,
    tax_id        TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    birth_date    DATE NOT NULL,
    address       TEXT NOT NULL,
    registered_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id        UUID PRIMARY KEY,
    number    BIGINT NOT NULL UNIQUE CHECK (number > 0),
    balance   BIGINT NOT NULL CHECK (balance >= 0),
    client_id UUID NOT NULL REFERENCES clients (id),
    opened_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    id         UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES accounts (id),
    kind       TEXT NOT NULL CHECK (kind IN ('deposit', 'withdrawal')),
    amount     BIGINT NOT NULL CHECK (amount > 0),
    posted_at  TIMESTAMPTZ NOT NULL,
    sequence   BIGINT NOT NULL CHECK (sequence > 0),
    UNIQUE (account_id, sequence)
);
"#;

/// Postgres-backed [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    tax_id: String,
    name: String,
    birth_date: NaiveDate,
    address: String,
    registered_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = StoreError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Client {
            id: ClientId::from_uuid(row.id),
            tax_id: TaxId::new(&row.tax_id).map_err(decode_error)?,
            name: row.name,
            birth_date: row.birth_date,
            address: row.address,
            registered_at: row.registered_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    number: i64,
    balance: i64,
    client_id: Uuid,
    opened_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId::from_uuid(row.id),
            number: AccountNumber::new(row.number).map_err(decode_error)?,
            balance: Money::from_minor_units(row.balance).map_err(decode_error)?,
            client_id: ClientId::from_uuid(row.client_id),
            opened_at: row.opened_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    kind: String,
    amount: i64,
    posted_at: DateTime<Utc>,
    sequence: i64,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            kind: row.kind.parse().map_err(decode_error)?,
            amount: Money::from_minor_units(row.amount).map_err(decode_error)?,
            posted_at: row.posted_at,
            sequence: row.sequence as u64,
        })
    }
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| StoreError::Backend(format!("connect: {e}")))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    #[instrument(skip(self, client), fields(tax_id = %client.tax_id), err)]
    async fn create_client_async(&self, client: Client) -> Result<Client, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, tax_id, name, birth_date, address, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*client.id.as_uuid())
        .bind(client.tax_id.as_str())
        .bind(&client.name)
        .bind(client.birth_date)
        .bind(&client.address)
        .bind(client.registered_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_client", e))?;

        Ok(client)
    }

    async fn client_by_tax_id_async(&self, tax_id: &TaxId) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, tax_id, name, birth_date, address, registered_at FROM clients WHERE tax_id = $1",
        )
        .bind(tax_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("client_by_tax_id", e))?;

        row.map(Client::try_from).transpose()
    }

    #[instrument(skip(self, account), fields(number = %account.number), err)]
    async fn create_account_async(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, number, balance, client_id, opened_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(account.number.value())
        .bind(account.balance.minor_units())
        .bind(*account.client_id.as_uuid())
        .bind(account.opened_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        Ok(account)
    }

    async fn accounts_for_client_async(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, number, balance, client_id, opened_at
            FROM accounts
            WHERE client_id = $1
            ORDER BY opened_at ASC, number ASC
            "#,
        )
        .bind(*client_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("accounts_for_client", e))?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn account_async(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, number, balance, client_id, opened_at FROM accounts WHERE id = $1",
        )
        .bind(*account_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("account", e))?;

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self), fields(account_id = %account_id, kind = %kind, amount = %amount), err)]
    async fn append_transaction_async(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("append_transaction.begin", e))?;

        // Conditional update: the balance can never be driven negative, even
        // by a caller that bypassed the engine's per-account serialization.
        let delta = kind.signed_minor_units(amount);
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE accounts
            SET balance = balance + $2
            WHERE id = $1 AND balance + $2 >= 0
            RETURNING balance
            "#,
        )
        .bind(*account_id.as_uuid())
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("append_transaction.update", e))?;

        if updated.is_none() {
            let balance = sqlx::query_scalar::<_, i64>(
                "SELECT balance FROM accounts WHERE id = $1",
            )
            .bind(*account_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("append_transaction.balance", e))?;

            return match balance {
                None => Err(StoreError::NotFound(format!("account {account_id}"))),
                Some(balance) => Err(StoreError::InsufficientBalance {
                    balance: Money::from_minor_units(balance).map_err(decode_error)?,
                    requested: amount,
                }),
            };
        }

        // Next gapless sequence and the non-decreasing timestamp clamp. The
        // UNIQUE (account_id, sequence) constraint turns a concurrent append
        // racing this read into a Conflict instead of a gap or duplicate.
        let (last_sequence, last_posted_at) = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            r#"
            SELECT COALESCE(MAX(sequence), 0), MAX(posted_at)
            FROM transactions
            WHERE account_id = $1
            "#,
        )
        .bind(*account_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("append_transaction.sequence", e))?;

        let sequence = (last_sequence + 1) as u64;
        let posted_at = match last_posted_at {
            Some(last) => posted_at.max(last),
            None => posted_at,
        };

        let recorded = Transaction::record(account_id, kind, amount, posted_at, sequence)
            .map_err(|e| StoreError::Backend(format!("invalid transaction: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, kind, amount, posted_at, sequence)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*recorded.id.as_uuid())
        .bind(*recorded.account_id.as_uuid())
        .bind(recorded.kind.as_str())
        .bind(recorded.amount.minor_units())
        .bind(recorded.posted_at)
        .bind(recorded.sequence as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("append_transaction.insert", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("append_transaction.commit", e))?;

        Ok(recorded)
    }

    async fn transactions_for_account_async(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM accounts WHERE id = $1")
            .bind(*account_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("transactions_for_account", e))?;
        if exists.is_none() {
            return Err(StoreError::NotFound(format!("account {account_id}")));
        }

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, account_id, kind, amount, posted_at, sequence
            FROM transactions
            WHERE account_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(*account_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("transactions_for_account", e))?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}

impl LedgerStore for PostgresLedgerStore {
    fn create_client(&self, client: Client) -> Result<Client, StoreError> {
        runtime_handle()?.block_on(self.create_client_async(client))
    }

    fn client_by_tax_id(&self, tax_id: &TaxId) -> Result<Option<Client>, StoreError> {
        runtime_handle()?.block_on(self.client_by_tax_id_async(tax_id))
    }

    fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        runtime_handle()?.block_on(self.create_account_async(account))
    }

    fn accounts_for_client(&self, client_id: ClientId) -> Result<Vec<Account>, StoreError> {
        runtime_handle()?.block_on(self.accounts_for_client_async(client_id))
    }

    fn primary_account_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts_for_client(client_id)?.into_iter().next())
    }

    fn account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        runtime_handle()?.block_on(self.account_async(account_id))
    }

    fn append_transaction(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        runtime_handle()?.block_on(self.append_transaction_async(
            account_id,
            kind,
            amount,
            posted_at,
        ))
    }

    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError> {
        runtime_handle()?.block_on(self.transactions_for_account_async(account_id))
    }
}

fn runtime_handle() -> Result<tokio::runtime::Handle, StoreError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Backend(
            "PostgresLedgerStore requires a tokio runtime context".to_string(),
        )
    })
}

fn decode_error(e: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("row decode: {e}"))
}

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Conflict(format!("{op}: {}", db.message())),
            Some("23503") => return StoreError::NotFound(format!("{op}: {}", db.message())),
            _ => {}
        }
    }
    StoreError::Backend(format!("{op}: {e}"))
}
