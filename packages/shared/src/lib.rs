pub mod auth;
pub mod models;
pub mod repositories;
pub mod services;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
