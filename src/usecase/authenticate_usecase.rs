use tracing::debug;

use crate::domain::{
    error::DomainError, models::user::User, repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

pub struct AuthenticateUsecase<U: UserRepository, P: PasswordHasher> {
    user_repository: U,
    password_hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> AuthenticateUsecase<U, P> {
    pub fn new(user_repository: U, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    pub async fn authenticate(
        &self,
        github_username: &str,
        password: &str,
    ) -> Result<User, DomainError>
    where
        U: Send + Sync,
    {
        let user = self
            .user_repository
            .find_by_github_username(github_username)
            .await?
            .ok_or_else(|| {
                debug!(github_username, "authentication for unknown user");
                DomainError::InvalidCredentials
            })?;

        match user.authenticate(password, &self.password_hasher) {
            Some(_) => Ok(user),
            None => {
                debug!(user_id = %user.id(), "password mismatch");
                Err(DomainError::InvalidCredentials)
            }
        }
    }
}
