//! sea-orm entity definitions

pub mod memberships;
pub mod users;
