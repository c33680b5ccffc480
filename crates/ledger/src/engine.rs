//! The ledger engine: business rules and atomicity around balance mutation.
//!
//! One engine instance serves many concurrent callers (one call per inbound
//! request). Balance-affecting operations on the same account serialize
//! through [`AccountLocks`]; the store's conditional update is the second
//! line of defense for the non-negative-balance invariant.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use ledgerbank_auth::Principal;
use ledgerbank_banking::{Account, AccountNumber, Client, TaxId, Transaction, TransactionKind};
use ledgerbank_core::Money;

use crate::error::LedgerError;
use crate::locks::AccountLocks;
use crate::store::{LedgerStore, StoreError};

/// Validated-at-the-edge registration input.
///
/// `TaxId` and the birth date are already typed; name and address are
/// validated by [`Client::register`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub tax_id: TaxId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub address: String,
}

/// Orchestrates deposit/withdraw/statement against the durable store.
#[derive(Debug)]
pub struct LedgerEngine<S> {
    store: S,
    locks: AccountLocks,
}

impl<S> LedgerEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: AccountLocks::new(),
        }
    }
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Register a new client.
    #[tracing::instrument(skip(self, principal, new_client), fields(tax_id = %new_client.tax_id), err)]
    pub fn register_client(
        &self,
        principal: &Principal,
        new_client: NewClient,
    ) -> Result<Client, LedgerError> {
        ensure_active(principal)?;

        let client = Client::register(
            new_client.tax_id,
            &new_client.name,
            new_client.birth_date,
            &new_client.address,
            Utc::now(),
        )?;
        let client = self.store.create_client(client)?;

        tracing::info!(client_id = %client.id, "client registered");
        Ok(client)
    }

    /// Look up a client by tax id.
    pub fn client_by_tax_id(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
    ) -> Result<Client, LedgerError> {
        ensure_active(principal)?;
        self.require_client(tax_id)
    }

    /// All accounts owned by the client, oldest first.
    pub fn accounts_for_client(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
    ) -> Result<Vec<Account>, LedgerError> {
        ensure_active(principal)?;
        let client = self.require_client(tax_id)?;
        Ok(self.store.accounts_for_client(client.id)?)
    }

    /// Open an account for the client.
    ///
    /// The account number must be unused; the initial balance is non-negative
    /// by construction of [`Money`].
    #[tracing::instrument(skip(self, principal), fields(tax_id = %tax_id, number = %number), err)]
    pub fn open_account(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
        number: AccountNumber,
        initial_balance: Money,
    ) -> Result<Account, LedgerError> {
        ensure_active(principal)?;

        let client = self.require_client(tax_id)?;
        let account = Account::open(number, client.id, initial_balance, Utc::now());

        let account = match self.store.create_account(account) {
            Ok(account) => account,
            // The client can only be missing if it vanished since resolution;
            // surface it the same way as an up-front miss.
            Err(StoreError::NotFound(_)) => return Err(LedgerError::ClientNotFound),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(account_id = %account.id, "account opened");
        Ok(account)
    }

    /// Deposit `amount` into the client's account.
    ///
    /// Postcondition: new balance = old balance + amount, exactly.
    #[tracing::instrument(skip(self, principal), fields(tax_id = %tax_id, amount = %amount), err)]
    pub fn deposit(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
        amount: Money,
    ) -> Result<Transaction, LedgerError> {
        ensure_active(principal)?;
        ensure_positive(amount)?;

        let account = self.resolve_primary_account(tax_id)?;
        self.locks.with_account(account.id, || {
            let current = self.current_account(account.id)?;
            if current.balance.checked_add(amount).is_none() {
                return Err(LedgerError::InvalidAmount(
                    "deposit would overflow the account balance".to_string(),
                ));
            }

            let recorded = self.store.append_transaction(
                current.id,
                TransactionKind::Deposit,
                amount,
                Utc::now(),
            )?;
            tracing::info!(transaction_id = %recorded.id, "deposit recorded");
            Ok(recorded)
        })
    }

    /// Withdraw `amount` from the client's account.
    ///
    /// The sufficiency check and the balance decrement are one indivisible
    /// step with respect to concurrent operations on the same account.
    /// Postconditions: new balance = old balance − amount, and ≥ 0.
    #[tracing::instrument(skip(self, principal), fields(tax_id = %tax_id, amount = %amount), err)]
    pub fn withdraw(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
        amount: Money,
    ) -> Result<Transaction, LedgerError> {
        ensure_active(principal)?;
        ensure_positive(amount)?;

        let account = self.resolve_primary_account(tax_id)?;
        self.locks.with_account(account.id, || {
            let current = self.current_account(account.id)?;
            if current.balance.checked_sub(amount).is_none() {
                return Err(LedgerError::InsufficientFunds {
                    balance: current.balance,
                    requested: amount,
                });
            }

            let recorded = self.store.append_transaction(
                current.id,
                TransactionKind::Withdrawal,
                amount,
                Utc::now(),
            )?;
            tracing::info!(transaction_id = %recorded.id, "withdrawal recorded");
            Ok(recorded)
        })
    }

    /// The account's full transaction history, in chronological order.
    ///
    /// Read-only: observes a consistent snapshot, never a partially-applied
    /// concurrent deposit/withdraw.
    pub fn statement(
        &self,
        principal: &Principal,
        tax_id: &TaxId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        ensure_active(principal)?;

        let account = self.resolve_primary_account(tax_id)?;
        let mut entries = self.store.transactions_for_account(account.id)?;
        entries.sort_by_key(|t| (t.posted_at, t.sequence));
        Ok(entries)
    }

    fn require_client(&self, tax_id: &TaxId) -> Result<Client, LedgerError> {
        self.store
            .client_by_tax_id(tax_id)?
            .ok_or(LedgerError::ClientNotFound)
    }

    fn resolve_primary_account(&self, tax_id: &TaxId) -> Result<Account, LedgerError> {
        let client = self.require_client(tax_id)?;
        self.store
            .primary_account_for_client(client.id)?
            .ok_or(LedgerError::AccountNotFound)
    }

    /// Re-read the account inside the critical section so the balance check
    /// sees the latest committed state.
    fn current_account(&self, account_id: ledgerbank_core::AccountId) -> Result<Account, LedgerError> {
        self.store
            .account(account_id)?
            .ok_or(LedgerError::AccountNotFound)
    }
}

fn ensure_active(principal: &Principal) -> Result<(), LedgerError> {
    if !principal.active {
        return Err(LedgerError::Unauthorized);
    }
    Ok(())
}

fn ensure_positive(amount: Money) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
