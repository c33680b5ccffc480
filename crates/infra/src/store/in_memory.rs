//! In-memory durable store.
//!
//! Intended for tests/dev. A single `RwLock` over the whole state makes every
//! multi-record mutation all-or-nothing: the balance write and the
//! transaction insert in [`append_transaction`](LedgerStore::append_transaction)
//! commit under one write guard.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use ledgerbank_banking::{Account, AccountNumber, Client, TaxId, Transaction, TransactionKind};
use ledgerbank_core::{AccountId, ClientId, Money};
use ledgerbank_ledger::{LedgerStore, StoreError};

#[derive(Debug, Default)]
struct State {
    clients: HashMap<ClientId, Client>,
    tax_ids: HashMap<TaxId, ClientId>,
    accounts: HashMap<AccountId, Account>,
    account_numbers: HashMap<AccountNumber, AccountId>,
    transactions: HashMap<AccountId, Vec<Transaction>>,
}

/// In-memory arena-style store keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("state lock poisoned".to_string())
}

impl LedgerStore for InMemoryLedgerStore {
    fn create_client(&self, client: Client) -> Result<Client, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if state.tax_ids.contains_key(&client.tax_id) {
            return Err(StoreError::Conflict(format!(
                "tax id {} already registered",
                client.tax_id
            )));
        }

        state.tax_ids.insert(client.tax_id.clone(), client.id);
        state.clients.insert(client.id, client.clone());
        Ok(client)
    }

    fn client_by_tax_id(&self, tax_id: &TaxId) -> Result<Option<Client>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .tax_ids
            .get(tax_id)
            .and_then(|id| state.clients.get(id))
            .cloned())
    }

    fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if state.account_numbers.contains_key(&account.number) {
            return Err(StoreError::Conflict(format!(
                "account number {} already in use",
                account.number
            )));
        }
        if !state.clients.contains_key(&account.client_id) {
            return Err(StoreError::NotFound(format!(
                "client {}",
                account.client_id
            )));
        }

        state.account_numbers.insert(account.number, account.id);
        state.transactions.insert(account.id, Vec::new());
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn accounts_for_client(&self, client_id: ClientId) -> Result<Vec<Account>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.opened_at, a.number));
        Ok(accounts)
    }

    fn primary_account_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts_for_client(client_id)?.into_iter().next())
    }

    fn account(&self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.accounts.get(&account_id).cloned())
    }

    fn append_transaction(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        posted_at: DateTime<Utc>,
    ) -> Result<Transaction, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let State {
            accounts,
            transactions,
            ..
        } = &mut *state;

        let account = accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))?;
        let entries = transactions
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::NotFound(format!("ledger for account {account_id}")))?;

        let delta = kind.signed_minor_units(amount);
        let new_units = account
            .balance
            .minor_units()
            .checked_add(delta)
            .ok_or_else(|| StoreError::Backend("balance overflow".to_string()))?;
        if new_units < 0 {
            return Err(StoreError::InsufficientBalance {
                balance: account.balance,
                requested: amount,
            });
        }

        // Monotonic per-account ordering: gapless 1-based sequence, timestamps
        // clamped non-decreasing.
        let sequence = entries.len() as u64 + 1;
        let posted_at = match entries.last() {
            Some(last) => posted_at.max(last.posted_at),
            None => posted_at,
        };

        let recorded = Transaction::record(account_id, kind, amount, posted_at, sequence)
            .map_err(|e| StoreError::Backend(format!("invalid transaction: {e}")))?;

        account.balance = Money::from_minor_units(new_units)
            .map_err(|e| StoreError::Backend(format!("invalid balance: {e}")))?;
        entries.push(recorded.clone());
        Ok(recorded)
    }

    fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        state
            .transactions
            .get(&account_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_client(tax_id: &str) -> Client {
        Client::register(
            TaxId::new(tax_id).unwrap(),
            "Maria Silva",
            ledgerbank_banking::parse_birth_date("01/01/1990").unwrap(),
            "Rua das Flores 123",
            Utc::now(),
        )
        .unwrap()
    }

    fn test_account(client: &Client, number: i64) -> Account {
        Account::open(
            AccountNumber::new(number).unwrap(),
            client.id,
            Money::ZERO,
            Utc::now(),
        )
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn duplicate_tax_id_is_a_conflict() {
        let store = InMemoryLedgerStore::new();
        store.create_client(test_client("11111111111")).unwrap();
        let err = store.create_client(test_client("11111111111")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn duplicate_account_number_is_a_conflict() {
        let store = InMemoryLedgerStore::new();
        let client = store.create_client(test_client("11111111111")).unwrap();
        store.create_account(test_account(&client, 1001)).unwrap();
        let err = store
            .create_account(test_account(&client, 1001))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn account_for_unknown_client_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let orphan = test_client("11111111111");
        let err = store.create_account(test_account(&orphan, 1001)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn primary_account_is_the_oldest() {
        let store = InMemoryLedgerStore::new();
        let client = store.create_client(test_client("11111111111")).unwrap();

        let t0 = Utc::now();
        let older = Account::open(
            AccountNumber::new(2002).unwrap(),
            client.id,
            Money::ZERO,
            t0,
        );
        let newer = Account::open(
            AccountNumber::new(1001).unwrap(),
            client.id,
            Money::ZERO,
            t0 + Duration::seconds(1),
        );
        store.create_account(newer).unwrap();
        store.create_account(older.clone()).unwrap();

        let primary = store.primary_account_for_client(client.id).unwrap().unwrap();
        assert_eq!(primary.id, older.id);
    }

    #[test]
    fn append_adjusts_balance_and_assigns_gapless_sequences() {
        let store = InMemoryLedgerStore::new();
        let client = store.create_client(test_client("11111111111")).unwrap();
        let account = store.create_account(test_account(&client, 1001)).unwrap();

        let t1 = store
            .append_transaction(account.id, TransactionKind::Deposit, money("100"), Utc::now())
            .unwrap();
        let t2 = store
            .append_transaction(account.id, TransactionKind::Withdrawal, money("40"), Utc::now())
            .unwrap();

        assert_eq!(t1.sequence, 1);
        assert_eq!(t2.sequence, 2);
        let balance = store.account(account.id).unwrap().unwrap().balance;
        assert_eq!(balance, money("60"));
    }

    #[test]
    fn overdraw_is_rejected_and_writes_nothing() {
        let store = InMemoryLedgerStore::new();
        let client = store.create_client(test_client("11111111111")).unwrap();
        let account = store.create_account(test_account(&client, 1001)).unwrap();
        store
            .append_transaction(account.id, TransactionKind::Deposit, money("100"), Utc::now())
            .unwrap();

        let err = store
            .append_transaction(
                account.id,
                TransactionKind::Withdrawal,
                money("100.01"),
                Utc::now(),
            )
            .unwrap_err();
        match err {
            StoreError::InsufficientBalance { balance, requested } => {
                assert_eq!(balance, money("100"));
                assert_eq!(requested, money("100.01"));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }

        assert_eq!(store.account(account.id).unwrap().unwrap().balance, money("100"));
        assert_eq!(store.transactions_for_account(account.id).unwrap().len(), 1);
    }

    #[test]
    fn posted_at_is_clamped_non_decreasing() {
        let store = InMemoryLedgerStore::new();
        let client = store.create_client(test_client("11111111111")).unwrap();
        let account = store.create_account(test_account(&client, 1001)).unwrap();

        let now = Utc::now();
        store
            .append_transaction(account.id, TransactionKind::Deposit, money("10"), now)
            .unwrap();
        // Simulated clock jump backwards.
        let clamped = store
            .append_transaction(
                account.id,
                TransactionKind::Deposit,
                money("10"),
                now - Duration::seconds(5),
            )
            .unwrap();
        assert_eq!(clamped.posted_at, now);
    }

    #[test]
    fn transactions_for_unknown_account_is_not_found() {
        let store = InMemoryLedgerStore::new();
        let err = store.transactions_for_account(AccountId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
