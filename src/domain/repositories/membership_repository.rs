use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{membership::Membership, user::UserId},
};

#[async_trait]
pub trait MembershipRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Membership>, RepositoryError>;
}
