//! Stateless session tokens (HS256 JWT).
//!
//! A token carries the subject id, the issued-at time and, unless the session was
//! opened with "stay connected", an expiry of issued-at + TTL. Verification pins the
//! algorithm and uses no leeway: a token is valid only while `now < exp`.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::SessionConfig;

pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl SessionClaims {
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self::issued_at(subject, Utc::now().timestamp())
    }

    #[must_use]
    pub fn issued_at(subject: impl Into<String>, iat: i64) -> Self {
        Self {
            sub: subject.into(),
            iat,
            exp: None,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp.is_some_and(|exp| now >= exp)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("unexpected algorithm")]
    Algorithm,
    #[error("token expired")]
    Expired,
    #[error("token ttl out of range: {0}")]
    TtlOutOfRange(i64),
    #[error("malformed token")]
    Malformed(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => Self::Algorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err),
        }
    }
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.token_secret(), config.token_ttl_seconds())
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a session token. `extended` ("stay connected") omits the expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded, or if the TTL is not
    /// positive or pushes the expiry past `i64::MAX`.
    pub fn sign(&self, mut claims: SessionClaims, extended: bool) -> Result<String, TokenError> {
        claims.exp = if extended {
            None
        } else {
            if self.ttl_seconds <= 0 {
                return Err(TokenError::TtlOutOfRange(self.ttl_seconds));
            }
            let exp = claims
                .iat
                .checked_add(self.ttl_seconds)
                .ok_or(TokenError::TtlOutOfRange(self.ttl_seconds))?;
            Some(exp)
        };
        self.encode(&claims)
    }

    /// Encode claims exactly as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be encoded.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    /// Verify signature, algorithm and expiry. Account existence is not checked here.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, signed with another key or
    /// algorithm, or expired.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        if data.claims.is_expired_at(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}
