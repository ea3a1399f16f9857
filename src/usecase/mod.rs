pub mod authenticate_usecase;
pub mod register_user_usecase;
