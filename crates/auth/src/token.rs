//! Access-token encoding and signature verification.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::TokenClaims;

#[derive(Debug, Error)]
pub enum TokenCodecError {
    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("invalid token: {0}")]
    Decode(String),
}

/// Encode/decode access tokens.
///
/// Decoding verifies the signature only; the time window is validated
/// separately and deterministically by [`crate::validate_claims`].
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError>;
    fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError>;
}

/// JWT wire form of [`TokenClaims`] (registered claim names, unix seconds).
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HMAC-SHA256 JWT codec.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenCodecError> {
        let wire = WireClaims {
            sub: claims.sub.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| TokenCodecError::Encode(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenCodecError> {
        // Expiry is validated by `validate_claims`, not here.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<WireClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenCodecError::Decode(e.to_string()))?;

        let issued_at = chrono::DateTime::from_timestamp(data.claims.iat, 0)
            .ok_or_else(|| TokenCodecError::Decode("iat out of range".to_string()))?;
        let expires_at = chrono::DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| TokenCodecError::Decode("exp out of range".to_string()))?;

        Ok(TokenClaims {
            sub: data.claims.sub,
            issued_at,
            expires_at,
        })
    }
}
