use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::ValidationErrors,
    models::password::{MIN_PASSWORD_LENGTH, PasswordDigest},
    services::password_service::PasswordHasher,
};

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";
pub const CONFIRMATION_MISMATCH: &str = "doesn't match Password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);
impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unpersisted user built from request attributes.
///
/// Every attribute is optional here; `validate` decides what is required.
#[derive(Clone, Default)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub github_username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("github_username", &self.github_username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field(
                "password_confirmation",
                &self.password_confirmation.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// A user that passed validation and is ready to be hashed and stored
pub struct ValidatedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub github_username: String,
    pub password: String,
}

impl fmt::Debug for ValidatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("github_username", &self.github_username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ValidatedUser {
    /// Replace the plaintext password with its digest
    pub fn with_digest(self, password_digest: PasswordDigest) -> UnsavedUser {
        UnsavedUser {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            github_username: self.github_username,
            password_digest,
        }
    }
}

/// Row handed to the repository; never carries a plaintext password
#[derive(Debug, Clone)]
pub struct UnsavedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub github_username: String,
    pub password_digest: PasswordDigest,
}

impl NewUser {
    /// Trimmed github username, if one was given
    pub fn github_username(&self) -> Option<&str> {
        present(self.github_username.as_deref())
    }

    /// Check every attribute, collecting all failures.
    pub fn validate(self) -> Result<ValidatedUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = required(&mut errors, "first_name", self.first_name.as_deref());
        let last_name = required(&mut errors, "last_name", self.last_name.as_deref());
        let github_username =
            required(&mut errors, "github_username", self.github_username.as_deref());

        // passwords are not trimmed
        let password = self.password.filter(|p| !p.is_empty());
        match &password {
            None => errors.add("password", BLANK),
            Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => errors.add(
                "password",
                &format!("is too short (minimum is {MIN_PASSWORD_LENGTH} characters)"),
            ),
            Some(_) => {}
        }

        if let (Some(password), Some(confirmation)) = (&password, &self.password_confirmation) {
            if password != confirmation {
                errors.add("password_confirmation", CONFIRMATION_MISMATCH);
            }
        }

        let email = self
            .email
            .as_deref()
            .and_then(|e| present(Some(e)))
            .map(str::to_string);

        match (first_name, last_name, github_username, password) {
            (Some(first_name), Some(last_name), Some(github_username), Some(password))
                if errors.is_empty() =>
            {
                Ok(ValidatedUser {
                    first_name,
                    last_name,
                    email,
                    github_username,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
    match present(value) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, BLANK);
            None
        }
    }
}

/// Persisted user
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    first_name: String,
    last_name: String,
    email: Option<String>,
    github_username: String,
    password_digest: PasswordDigest,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: UserId,
        first_name: String,
        last_name: String,
        email: Option<String>,
        github_username: String,
        password_digest: PasswordDigest,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            email,
            github_username,
            password_digest,
            created_at,
            updated_at,
        }
    }

    /// Returns `Some(self)` when `plain_password` matches the stored digest.
    pub fn authenticate<P: PasswordHasher>(&self, plain_password: &str, hasher: &P) -> Option<&Self> {
        match hasher.verify(plain_password, &self.password_digest) {
            Ok(true) => Some(self),
            _ => None,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }
    pub fn first_name(&self) -> &str {
        &self.first_name
    }
    pub fn last_name(&self) -> &str {
        &self.last_name
    }
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
    pub fn github_username(&self) -> &str {
        &self.github_username
    }
    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password_digest
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
