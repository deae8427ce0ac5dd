pub mod clock;
pub mod password;
pub mod signing_key;
pub mod tokens;
