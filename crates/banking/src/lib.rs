//! Banking domain entities (clients, accounts, transactions).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod account;
pub mod client;
pub mod transaction;

pub use account::{Account, AccountNumber};
pub use client::{parse_birth_date, Client, TaxId};
pub use transaction::{Transaction, TransactionKind};
