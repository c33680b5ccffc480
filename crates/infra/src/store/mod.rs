//! [`LedgerStore`](ledgerbank_ledger::LedgerStore) implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
