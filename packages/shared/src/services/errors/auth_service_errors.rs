use crate::auth::tokens::TokenError;
use crate::repositories::errors::member_repository_errors::MemberRepositoryError;
use crate::repositories::errors::session_cache_errors::SessionCacheError;
use std::fmt;

#[derive(Debug)]
pub enum AuthServiceError {
    Token(TokenError),
    /// Refresh token unknown, already used, revoked or expired.
    InvalidRefresh,
    /// No member row to bind the session to.
    UnknownMember,
    JwtError(String),
    CacheError(SessionCacheError),
    RepositoryError(MemberRepositoryError),
}

impl fmt::Display for AuthServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthServiceError::Token(err) => write!(f, "{}", err),
            AuthServiceError::InvalidRefresh => write!(f, "Invalid or expired refresh token"),
            AuthServiceError::UnknownMember => write!(f, "Member does not exist"),
            AuthServiceError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            AuthServiceError::CacheError(err) => write!(f, "Session cache error: {}", err),
            AuthServiceError::RepositoryError(err) => write!(f, "Member repository error: {}", err),
        }
    }
}

impl std::error::Error for AuthServiceError {}

impl From<TokenError> for AuthServiceError {
    fn from(err: TokenError) -> Self {
        AuthServiceError::Token(err)
    }
}

impl From<SessionCacheError> for AuthServiceError {
    fn from(err: SessionCacheError) -> Self {
        AuthServiceError::CacheError(err)
    }
}

impl From<MemberRepositoryError> for AuthServiceError {
    fn from(err: MemberRepositoryError) -> Self {
        match err {
            MemberRepositoryError::NotFound => AuthServiceError::UnknownMember,
            other => AuthServiceError::RepositoryError(other),
        }
    }
}
