//! Access token signing/verification and opaque refresh token generation.
//!
//! Everything here is stateless; refresh token storage lives in the auth service.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use rand::Rng;

use crate::auth::signing_key::SigningKey;
use crate::models::auth::responses::TokenClaims;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Why an access token was rejected. Each variant has a stable reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Empty,
    Malformed,
    BadSignature,
    Expired,
    Unsupported,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Empty => "EMPTY",
            TokenError::Malformed => "MALFORMED",
            TokenError::BadSignature => "BAD_SIGNATURE",
            TokenError::Expired => "EXPIRED",
            TokenError::Unsupported => "UNSUPPORTED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TokenError::Empty => "JWT claims is empty",
            TokenError::Malformed => "Malformed JWT token",
            TokenError::BadSignature => "Invalid JWT signature",
            TokenError::Expired => "Expired JWT token",
            TokenError::Unsupported => "Unsupported JWT token",
        }
    }
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::InvalidKeyFormat => TokenError::Unsupported,
            ErrorKind::MissingRequiredClaim(_) => TokenError::Empty,
            _ => TokenError::Malformed,
        }
    }
}

pub fn encode_access_token(
    key: &SigningKey,
    claims: &TokenClaims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::new(Algorithm::HS256), claims, key.encoding())
}

/// Verifies signature and algorithm, then checks `exp` against `now`.
///
/// Expiry is checked here rather than by `jsonwebtoken` so the caller's clock
/// decides, and so a token is valid at every instant strictly before `exp`.
pub fn decode_access_token(
    key: &SigningKey,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<TokenClaims>(token, key.decoding(), &validation)?.claims;
    if claims.sub.is_empty() {
        return Err(TokenError::Empty);
    }
    if claims.exp <= now.timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

/// Strips the `Bearer ` prefix of an `Authorization` header value.
pub fn strip_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.trim().is_empty())
}

/// 32 random bytes, base64url encoded without padding (43 characters).
pub fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
