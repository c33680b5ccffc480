//! Per-account serialization.
//!
//! All balance-affecting operations on a given account run inside that
//! account's exclusive critical section; operations on different accounts do
//! not block one another. The critical section covers only the
//! read-check-write of a single account's balance plus the transaction
//! insert, so no operation blocks indefinitely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ledgerbank_core::AccountId;

use crate::error::LedgerError;
use crate::store::StoreError;

/// Registry of per-account mutexes.
///
/// The registry lock is held only long enough to clone the account's slot;
/// the slot itself is held for the duration of the caller's closure. Slots
/// are created on first use and never removed — accounts are never deleted
/// in scope, and the slot is two words.
#[derive(Debug, Default)]
pub struct AccountLocks {
    slots: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` inside the account's exclusive critical section.
    pub fn with_account<T>(
        &self,
        account_id: AccountId,
        f: impl FnOnce() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| poisoned("account lock registry"))?;
            Arc::clone(slots.entry(account_id).or_default())
        };

        let _guard = slot.lock().map_err(|_| poisoned("account lock"))?;
        f()
    }
}

fn poisoned(what: &str) -> LedgerError {
    LedgerError::Storage(StoreError::Backend(format!("{what} poisoned")))
}
