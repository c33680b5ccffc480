//! The authentication gateway: credentials in, principals out.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::claims::{validate_claims, TokenClaims, TokenValidationError};
use crate::credentials::CredentialStore;
use crate::principal::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenValidationError),
}

/// Verifies caller credentials and issues/resolves time-bounded claims.
///
/// The gateway owns no tokens on the wire: encoding and signature live in a
/// [`crate::TokenCodec`], chosen by the transport layer.
#[derive(Debug)]
pub struct AuthGateway<C> {
    credentials: C,
    token_ttl: Duration,
}

impl<C> AuthGateway<C> {
    pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

    pub fn new(credentials: C) -> Self {
        Self {
            credentials,
            token_ttl: Duration::minutes(Self::DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    pub fn with_token_ttl(credentials: C, token_ttl: Duration) -> Self {
        Self {
            credentials,
            token_ttl,
        }
    }
}

impl<C: CredentialStore> AuthGateway<C> {
    /// Verify a username/password pair and issue claims valid from `now`.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let record = self
            .credentials
            .find(username)
            .ok_or(AuthError::InvalidCredentials)?;

        if !record.verify_password(password) {
            tracing::debug!(username, "password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(TokenClaims {
            sub: record.username,
            issued_at: now,
            expires_at: now + self.token_ttl,
        })
    }

    /// Resolve validated claims to the principal they identify.
    ///
    /// The returned principal carries the stored `active` flag as-is; the
    /// ledger engine is the enforcement point for inactive callers.
    pub fn resolve(
        &self,
        claims: &TokenClaims,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        validate_claims(claims, now)?;

        let record = self
            .credentials
            .find(&claims.sub)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(Principal {
            username: record.username,
            display_name: record.display_name,
            active: record.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{CredentialRecord, InMemoryCredentialStore};

    fn gateway() -> AuthGateway<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::new();
        store.upsert(CredentialRecord::new(
            "user@example.com",
            Some("John Doe".to_string()),
            "salt-1",
            "password",
            true,
        ));
        store.upsert(CredentialRecord::new(
            "dormant@example.com",
            None,
            "salt-2",
            "password",
            false,
        ));
        AuthGateway::new(store)
    }

    #[test]
    fn authenticate_issues_claims_with_the_configured_ttl() {
        let gateway = gateway();
        let now = Utc::now();
        let claims = gateway.authenticate("user@example.com", "password", now).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.issued_at, now);
        assert_eq!(
            claims.expires_at - claims.issued_at,
            Duration::minutes(AuthGateway::<InMemoryCredentialStore>::DEFAULT_TOKEN_TTL_MINUTES)
        );
    }

    #[test]
    fn authenticate_rejects_bad_passwords_and_unknown_users() {
        let gateway = gateway();
        let now = Utc::now();
        assert_eq!(
            gateway.authenticate("user@example.com", "wrong", now),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            gateway.authenticate("nobody@example.com", "password", now),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn resolve_round_trips_to_a_principal() {
        let gateway = gateway();
        let now = Utc::now();
        let claims = gateway.authenticate("user@example.com", "password", now).unwrap();
        let principal = gateway.resolve(&claims, now).unwrap();
        assert_eq!(principal.username, "user@example.com");
        assert_eq!(principal.display_name.as_deref(), Some("John Doe"));
        assert!(principal.is_active());
    }

    #[test]
    fn resolve_rejects_expired_claims() {
        let gateway = gateway();
        let now = Utc::now();
        let claims = gateway.authenticate("user@example.com", "password", now).unwrap();
        let later = now + Duration::minutes(31);
        assert_eq!(
            gateway.resolve(&claims, later),
            Err(AuthError::Token(TokenValidationError::Expired))
        );
    }

    #[test]
    fn resolve_carries_the_inactive_flag_through() {
        let gateway = gateway();
        let now = Utc::now();
        let claims = gateway
            .authenticate("dormant@example.com", "password", now)
            .unwrap();
        let principal = gateway.resolve(&claims, now).unwrap();
        assert!(!principal.is_active());
    }

    #[test]
    fn resolve_rejects_claims_for_vanished_users() {
        let gateway = gateway();
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "ghost@example.com".to_string(),
            issued_at: now,
            expires_at: now + Duration::minutes(30),
        };
        assert_eq!(gateway.resolve(&claims, now), Err(AuthError::InvalidCredentials));
    }
}
