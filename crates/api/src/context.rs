//! Per-request context.

use ledgerbank_auth::Principal;

/// Authenticated principal for a request.
///
/// Present on every protected route; inserted by the auth middleware.
#[derive(Debug, Clone)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
