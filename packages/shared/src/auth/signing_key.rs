use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{DecodingKey, EncodingKey};

/// HMAC key material for access tokens, decoded once at startup.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SigningKeyError {
    InvalidBase64(String),
    TooShort(usize),
}

impl std::fmt::Display for SigningKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningKeyError::InvalidBase64(msg) => write!(f, "Invalid base64 secret: {}", msg),
            SigningKeyError::TooShort(len) => write!(
                f,
                "Secret is {} bytes, HS256 needs at least {}",
                len,
                SigningKey::MIN_KEY_BYTES
            ),
        }
    }
}

impl std::error::Error for SigningKeyError {}

impl SigningKey {
    /// HS256 keys shorter than the hash output are rejected.
    pub const MIN_KEY_BYTES: usize = 32;

    pub fn from_base64(secret: &str) -> Result<Self, SigningKeyError> {
        let bytes = STANDARD
            .decode(secret.trim())
            .map_err(|e| SigningKeyError::InvalidBase64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningKeyError> {
        if bytes.len() < Self::MIN_KEY_BYTES {
            return Err(SigningKeyError::TooShort(bytes.len()));
        }
        Ok(SigningKey {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}
