pub mod auth_service_errors;
pub mod meeting_service_errors;
pub mod member_service_errors;
