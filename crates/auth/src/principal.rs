//! Verified caller identity.

use serde::{Deserialize, Serialize};

/// Identity of an authenticated principal.
///
/// This is the minimum the ledger requires of its callers: a stable username
/// and an active flag. How the identity was verified is the gateway's
/// concern; whether an inactive principal may operate is the engine's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub display_name: Option<String>,
    pub active: bool,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.active
    }
}
