use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::member::MemberRole;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String, // member email
    pub auth: MemberRole,
    pub exp: i64,
    pub iat: i64,
}

/// Session cache value stored under a refresh token.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    pub email: String,
    pub role: MemberRole,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
