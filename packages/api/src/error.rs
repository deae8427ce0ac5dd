use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use shared::auth::tokens::TokenError;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, meeting_service_errors::MeetingServiceError,
    member_service_errors::MemberServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    MemberService(MemberServiceError),
    AuthService(AuthServiceError),
    MeetingService(MeetingServiceError),
    Token(TokenError),
}

/// Body of every error response. `key` names the status, `reason` the cause.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub key: String,
    pub status_code: u16,
    pub reason: String,
    pub message: String,
}

impl From<MemberServiceError> for ApiError {
    fn from(error: MemberServiceError) -> Self {
        ApiError::MemberService(error)
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<MeetingServiceError> for ApiError {
    fn from(error: MeetingServiceError) -> Self {
        ApiError::MeetingService(error)
    }
}

impl From<TokenError> for ApiError {
    fn from(error: TokenError) -> Self {
        ApiError::Token(error)
    }
}

const INTERNAL: (StatusCode, &str) = (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");

fn auth_status(error: &AuthServiceError) -> (StatusCode, &'static str) {
    match error {
        AuthServiceError::Token(token) => (StatusCode::UNAUTHORIZED, token.code()),
        AuthServiceError::InvalidRefresh => (StatusCode::UNAUTHORIZED, "INVALID_REFRESH"),
        AuthServiceError::UnknownMember => (StatusCode::UNAUTHORIZED, "UNKNOWN_MEMBER"),
        AuthServiceError::JwtError(_)
        | AuthServiceError::CacheError(_)
        | AuthServiceError::RepositoryError(_) => INTERNAL,
    }
}

impl ApiError {
    pub fn status_and_reason(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Token(token) => (StatusCode::UNAUTHORIZED, token.code()),

            ApiError::AuthService(error) => auth_status(error),

            ApiError::MemberService(MemberServiceError::ValidationError(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::MemberService(MemberServiceError::MemberNotFound) => {
                (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND")
            }
            ApiError::MemberService(MemberServiceError::MemberAlreadyExists) => {
                (StatusCode::CONFLICT, "DUPLICATE_EMAIL")
            }
            ApiError::MemberService(MemberServiceError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            }
            ApiError::MemberService(MemberServiceError::MemberInUse) => {
                (StatusCode::CONFLICT, "MEMBER_IN_USE")
            }
            ApiError::MemberService(MemberServiceError::AuthServiceError(error)) => {
                auth_status(error)
            }
            ApiError::MemberService(
                MemberServiceError::PasswordHash(_) | MemberServiceError::RepositoryError(_),
            ) => INTERNAL,

            ApiError::MeetingService(MeetingServiceError::ValidationError(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::MeetingService(MeetingServiceError::MeetingNotFound) => {
                (StatusCode::NOT_FOUND, "MEETING_NOT_FOUND")
            }
            ApiError::MeetingService(MeetingServiceError::MemberNotFound) => {
                (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND")
            }
            ApiError::MeetingService(MeetingServiceError::Forbidden) => {
                (StatusCode::FORBIDDEN, "NOT_MEETING_CREATOR")
            }
            ApiError::MeetingService(MeetingServiceError::AlreadyJoined) => {
                (StatusCode::CONFLICT, "ALREADY_JOINED")
            }
            ApiError::MeetingService(MeetingServiceError::CapacityExceeded) => {
                (StatusCode::CONFLICT, "MEETING_FULL")
            }
            ApiError::MeetingService(MeetingServiceError::NotOpen) => {
                (StatusCode::CONFLICT, "MEETING_NOT_OPEN")
            }
            ApiError::MeetingService(MeetingServiceError::RepositoryError(_)) => INTERNAL,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Token(token) => token.message().to_string(),
            ApiError::AuthService(error) => error.to_string(),
            ApiError::MemberService(error) => error.to_string(),
            ApiError::MeetingService(error) => error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason) = self.status_and_reason();
        // Infrastructure detail stays in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.message()
        };

        let key = status
            .canonical_reason()
            .unwrap_or("ERROR")
            .to_uppercase()
            .replace(' ', "_");
        let body = ErrorResponse {
            key,
            status_code: status.as_u16(),
            reason: reason.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
