pub mod flash;
pub mod handlers;
