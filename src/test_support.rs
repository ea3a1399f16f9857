//! In-memory doubles shared by unit and router tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    error::{DomainError, RepositoryError},
    models::{
        password::PasswordDigest,
        user::{UnsavedUser, User, UserId},
    },
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<User>>>,
    failure: Option<Failure>,
}

#[derive(Clone, Copy)]
enum Failure {
    Database,
    Conflict,
}

impl InMemoryUserRepository {
    /// Every insert fails with a database error
    pub fn unavailable() -> Self {
        Self {
            failure: Some(Failure::Database),
            ..Default::default()
        }
    }

    /// Every insert hits the unique index, as if another request won the race
    pub fn racing() -> Self {
        Self {
            failure: Some(Failure::Conflict),
            ..Default::default()
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    pub fn seed(&self, github_username: &str, digest: PasswordDigest) -> User {
        let now = Utc::now();
        let user = User::reconstruct(
            UserId::new(),
            "Seeded".to_string(),
            "User".to_string(),
            None,
            github_username.to_string(),
            digest,
            now,
            now,
        );
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_github_username(
        &self,
        github_username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.github_username() == github_username)
            .cloned())
    }

    async fn insert(&self, user: UnsavedUser) -> Result<User, RepositoryError> {
        match self.failure {
            Some(Failure::Database) => {
                return Err(RepositoryError::DatabaseError("connection refused".to_string()));
            }
            Some(Failure::Conflict) => {
                return Err(RepositoryError::Conflict(
                    "users_github_username_key".to_string(),
                ));
            }
            None => {}
        }

        let now = Utc::now();
        let user = User::reconstruct(
            UserId::new(),
            user.first_name,
            user.last_name,
            user.email,
            user.github_username,
            user.password_digest,
            now,
            now,
        );
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

/// Deterministic hasher: digest is "digest:" followed by the plaintext
#[derive(Clone)]
pub struct PrefixHasher;

impl PasswordHasher for PrefixHasher {
    fn hash(&self, plain_password: &str) -> Result<PasswordDigest, DomainError> {
        Ok(PasswordDigest::new(format!("digest:{plain_password}")))
    }

    fn verify(&self, plain_password: &str, digest: &PasswordDigest) -> Result<bool, DomainError> {
        match digest.as_str().strip_prefix("digest:") {
            Some(stored) => Ok(stored == plain_password),
            None => Err(DomainError::PasswordHashing("malformed digest".to_string())),
        }
    }
}
