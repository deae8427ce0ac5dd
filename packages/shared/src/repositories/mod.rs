pub mod errors;
pub mod meeting_repository;
pub mod member_repository;
pub mod session_cache;
