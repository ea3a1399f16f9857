pub mod membership;
pub mod password;
pub mod user;
