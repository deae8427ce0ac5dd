use crate::repositories::errors::meeting_repository_errors::MeetingRepositoryError;

#[derive(Debug)]
pub enum MeetingServiceError {
    ValidationError(String),
    MeetingNotFound,
    MemberNotFound,
    /// The member is not the meeting's creator.
    Forbidden,
    AlreadyJoined,
    CapacityExceeded,
    NotOpen,
    RepositoryError(String),
}

impl std::fmt::Display for MeetingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            MeetingServiceError::MeetingNotFound => write!(f, "Meeting not found"),
            MeetingServiceError::MemberNotFound => write!(f, "Member not found"),
            MeetingServiceError::Forbidden => write!(f, "Only the creator can modify a meeting"),
            MeetingServiceError::AlreadyJoined => write!(f, "Already joined this meeting"),
            MeetingServiceError::CapacityExceeded => write!(f, "Meeting is full"),
            MeetingServiceError::NotOpen => write!(f, "Meeting is not open for entry"),
            MeetingServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for MeetingServiceError {}

impl From<MeetingRepositoryError> for MeetingServiceError {
    fn from(err: MeetingRepositoryError) -> Self {
        match err {
            MeetingRepositoryError::NotFound => MeetingServiceError::MeetingNotFound,
            MeetingRepositoryError::AlreadyJoined => MeetingServiceError::AlreadyJoined,
            MeetingRepositoryError::CapacityExceeded => MeetingServiceError::CapacityExceeded,
            MeetingRepositoryError::NotOpen => MeetingServiceError::NotOpen,
            MeetingRepositoryError::Database(msg) => MeetingServiceError::RepositoryError(msg),
        }
    }
}
