#[derive(Debug)]
pub enum MemberRepositoryError {
    NotFound,
    AlreadyExists,
    /// Rows in other tables (created meetings) still point at the member.
    InUse,
    Database(String),
}

impl std::fmt::Display for MemberRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRepositoryError::NotFound => write!(f, "Member not found"),
            MemberRepositoryError::AlreadyExists => write!(f, "Member already exists"),
            MemberRepositoryError::InUse => write!(f, "Member still owns meetings"),
            MemberRepositoryError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for MemberRepositoryError {}

impl From<sqlx::Error> for MemberRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MemberRepositoryError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                MemberRepositoryError::AlreadyExists
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                MemberRepositoryError::InUse
            }
            other => MemberRepositoryError::Database(other.to_string()),
        }
    }
}
