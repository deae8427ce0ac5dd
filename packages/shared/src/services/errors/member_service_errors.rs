use crate::services::errors::auth_service_errors::AuthServiceError;
use std::fmt;

#[derive(Debug)]
pub enum MemberServiceError {
    ValidationError(String),
    MemberNotFound,
    MemberAlreadyExists,
    InvalidCredentials,
    /// The member still created meetings and cannot be removed.
    MemberInUse,
    PasswordHash(String),
    RepositoryError(String),
    AuthServiceError(AuthServiceError),
}

impl fmt::Display for MemberServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemberServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            MemberServiceError::MemberNotFound => write!(f, "Member not found"),
            MemberServiceError::MemberAlreadyExists => write!(f, "Email is already registered"),
            MemberServiceError::InvalidCredentials => write!(f, "Invalid email or password"),
            MemberServiceError::MemberInUse => {
                write!(f, "Member still owns meetings and cannot sign out")
            }
            MemberServiceError::PasswordHash(msg) => write!(f, "Password hash error: {}", msg),
            MemberServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            MemberServiceError::AuthServiceError(err) => write!(f, "Auth service error: {}", err),
        }
    }
}

impl std::error::Error for MemberServiceError {}

impl From<AuthServiceError> for MemberServiceError {
    fn from(err: AuthServiceError) -> Self {
        MemberServiceError::AuthServiceError(err)
    }
}
