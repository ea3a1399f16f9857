pub mod argon2_password_hasher;
pub mod entity;
pub mod membership_repository;
pub mod user_repository;
