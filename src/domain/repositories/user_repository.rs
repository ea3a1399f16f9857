use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::user::{UnsavedUser, User},
};

#[async_trait]
pub trait UserRepository {
    async fn find_by_github_username(
        &self,
        github_username: &str,
    ) -> Result<Option<User>, RepositoryError>;
    /// Insert one row, stamping id and timestamps
    async fn insert(&self, user: UnsavedUser) -> Result<User, RepositoryError>;
}
