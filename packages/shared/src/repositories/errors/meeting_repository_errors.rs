#[derive(Debug)]
pub enum MeetingRepositoryError {
    NotFound,
    AlreadyJoined,
    CapacityExceeded,
    NotOpen,
    Database(String),
}

impl std::fmt::Display for MeetingRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingRepositoryError::NotFound => write!(f, "Meeting not found"),
            MeetingRepositoryError::AlreadyJoined => write!(f, "Member already joined meeting"),
            MeetingRepositoryError::CapacityExceeded => write!(f, "Meeting is full"),
            MeetingRepositoryError::NotOpen => write!(f, "Meeting is not open"),
            MeetingRepositoryError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for MeetingRepositoryError {}

impl From<sqlx::Error> for MeetingRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MeetingRepositoryError::NotFound,
            other => MeetingRepositoryError::Database(other.to_string()),
        }
    }
}
