#[derive(Debug)]
pub enum SessionCacheError {
    Serialization(String),
    Redis(String),
}

impl std::fmt::Display for SessionCacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionCacheError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            SessionCacheError::Redis(msg) => write!(f, "Redis error: {}", msg),
        }
    }
}

impl std::error::Error for SessionCacheError {}

impl From<redis::RedisError> for SessionCacheError {
    fn from(err: redis::RedisError) -> Self {
        SessionCacheError::Redis(err.to_string())
    }
}
