pub mod meeting_repository_errors;
pub mod member_repository_errors;
pub mod session_cache_errors;
