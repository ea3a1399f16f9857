use tracing::{debug, error, info, warn};

use crate::domain::{
    error::{DomainError, RepositoryError, ValidationErrors},
    models::user::{NewUser, TAKEN, User},
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

pub struct RegisterUserUsecase<R: UserRepository, P: PasswordHasher> {
    user_repository: R,
    password_hasher: P,
}

impl<R: UserRepository, P: PasswordHasher> RegisterUserUsecase<R, P> {
    pub fn new(user_repository: R, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Blank, unpersisted user backing the registration form
    pub fn new_user(&self) -> NewUser {
        NewUser::default()
    }

    /// Validate, hash and persist `new_user`.
    ///
    /// Nothing is written unless every validation passes. The stored digest
    /// always comes from the configured `PasswordHasher`.
    pub async fn save(&self, new_user: NewUser) -> Result<User, DomainError>
    where
        R: Send + Sync,
    {
        let taken = match new_user.github_username() {
            Some(github_username) => self
                .user_repository
                .find_by_github_username(github_username)
                .await?
                .is_some(),
            None => false,
        };

        let validated = match new_user.validate() {
            Ok(validated) if !taken => validated,
            result => {
                let mut errors = result.err().unwrap_or_default();
                if taken {
                    errors.add("github_username", TAKEN);
                }
                warn!(errors = ?errors.full_messages(), "user failed validation");
                return Err(DomainError::Validation(errors));
            }
        };

        let password_digest = self.password_hasher.hash(&validated.password)?;

        let user = match self
            .user_repository
            .insert(validated.with_digest(password_digest))
            .await
        {
            Ok(user) => user,
            Err(RepositoryError::Conflict(detail)) => {
                debug!(%detail, "unique index rejected insert");
                let mut errors = ValidationErrors::new();
                errors.add("github_username", TAKEN);
                return Err(DomainError::Validation(errors));
            }
            Err(e) => {
                error!(error = %e, "failed to persist user");
                return Err(e.into());
            }
        };

        info!(user_id = %user.id(), github_username = user.github_username(), "user registered");
        Ok(user)
    }
}
