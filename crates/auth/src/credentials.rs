//! Credential records and the store they live in.
//!
//! Passwords are never held in the clear: records carry a per-user salt and
//! a SHA-256 digest of `salt || password`. The store is a trait so the
//! gateway works against any backend; the in-memory implementation serves
//! tests and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};

/// A stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub display_name: Option<String>,
    pub salt: String,
    pub password_digest: String,
    pub active: bool,
}

impl CredentialRecord {
    /// Build a record from a clear-text password, digesting it immediately.
    pub fn new(
        username: impl Into<String>,
        display_name: Option<String>,
        salt: impl Into<String>,
        password: &str,
        active: bool,
    ) -> Self {
        let salt = salt.into();
        let password_digest = digest_password(&salt, password);
        Self {
            username: username.into(),
            display_name,
            salt,
            password_digest,
            active,
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        digest_password(&self.salt, candidate) == self.password_digest
    }
}

/// Hex-encoded SHA-256 of `salt || password`.
pub fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Lookup access to credential records.
pub trait CredentialStore: Send + Sync {
    fn find(&self, username: &str) -> Option<CredentialRecord>;
}

impl<C> CredentialStore for Arc<C>
where
    C: CredentialStore + ?Sized,
{
    fn find(&self, username: &str) -> Option<CredentialRecord> {
        (**self).find(username)
    }
}

/// In-memory credential store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a credential record.
    pub fn upsert(&self, record: CredentialRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(record.username.clone(), record);
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find(&self, username: &str) -> Option<CredentialRecord> {
        self.users.read().ok()?.get(username).cloned()
    }
}
