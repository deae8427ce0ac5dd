pub mod auth;
pub mod meeting;
pub mod member;
pub mod slice;
