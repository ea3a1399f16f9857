pub mod membership_repository;
pub mod user_repository;
