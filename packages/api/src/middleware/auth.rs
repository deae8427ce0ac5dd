use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};
use shared::auth::tokens::{strip_bearer, TokenError, BEARER_PREFIX};
use shared::models::member::MemberRole;

/// Identity taken from a valid `Authorization: Bearer` access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedMember {
    pub email: String,
    pub role: MemberRole,
}

fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::Empty)?
        .to_str()
        .map_err(|_| TokenError::Malformed)?;

    match strip_bearer(header) {
        Some(token) => Ok(token),
        None if header.trim().is_empty() || header.starts_with(BEARER_PREFIX.trim_end()) => {
            Err(TokenError::Empty)
        }
        None => Err(TokenError::Unsupported),
    }
}

impl FromRequestParts<AppState> for AuthenticatedMember {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(|e| {
            warn!("Rejected request to {}: {}", parts.uri.path(), e.code());
            ApiError::Token(e)
        })?;

        let claims = state.auth_service.validate(token).map_err(|e| {
            warn!("Rejected access token on {}: {}", parts.uri.path(), e.code());
            ApiError::Token(e)
        })?;

        Ok(AuthenticatedMember {
            email: claims.sub,
            role: claims.auth,
        })
    }
}
