use chrono::Duration;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Expiry applied when a caller issues a token without an explicit TTL.
/// Tokens are never issued without an expiry.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's email address.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Why a token failed validation. The access guard collapses both cases into
/// a single 401, but callers that log want to tell them apart.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Malformed,
}

/// Issues and validates signed, time-limited access tokens.
///
/// Built once from `Config` at startup and shared immutably across requests;
/// the signing key never leaves this struct and business logic never touches
/// the environment for it.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    /// Creates a service signing with the given symmetric `secret` and
    /// HS-family `algorithm`. `default_ttl_minutes` applies when `issue` is
    /// called without an explicit TTL.
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
            validation: Validation::new(algorithm),
            default_ttl: Duration::minutes(default_ttl_minutes),
        }
    }

    /// Issues a token asserting `subject` until `now + ttl`.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| AppError::Internal("token expiry overflow".into()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies signature and expiry, returning the subject on success.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}
