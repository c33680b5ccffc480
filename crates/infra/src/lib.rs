//! Infrastructure layer: durable store implementations.

pub mod store;

pub use store::{InMemoryLedgerStore, PostgresLedgerStore};

#[cfg(test)]
mod integration_tests;
