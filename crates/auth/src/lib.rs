//! `ledgerbank-auth` — authentication gateway (verified caller identities).
//!
//! This crate is intentionally decoupled from HTTP and storage: it validates
//! credentials and token claims, and yields a [`Principal`] for the ledger's
//! callers. Whether the principal may transact is the ledger engine's call.

pub mod claims;
pub mod credentials;
pub mod gateway;
pub mod principal;
pub mod token;

pub use claims::{validate_claims, TokenClaims, TokenValidationError};
pub use credentials::{CredentialRecord, CredentialStore, InMemoryCredentialStore};
pub use gateway::{AuthError, AuthGateway};
pub use principal::Principal;
pub use token::{Hs256TokenCodec, TokenCodec, TokenCodecError};
