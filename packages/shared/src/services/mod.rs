pub mod auth_service;
pub mod errors;
pub mod meeting_service;
pub mod member_service;
