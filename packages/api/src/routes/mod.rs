pub mod health;
pub mod meeting;
pub mod member;
