//! `ledgerbank-ledger` — the ledger engine.
//!
//! This crate owns the correctness-critical core: the repository contract over
//! the durable store, the per-account serialization layer, and the engine that
//! enforces the business rules around balance mutation. Everything here is
//! safe to call concurrently from many independent callers.

pub mod engine;
pub mod error;
pub mod locks;
pub mod store;

pub use engine::{LedgerEngine, NewClient};
pub use error::LedgerError;
pub use locks::AccountLocks;
pub use store::{LedgerStore, StoreError};
