use argon2::{
    Argon2, PasswordHash,
    password_hash::{self, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::domain::{
    error::DomainError, models::password::PasswordDigest,
    services::password_service::PasswordHasher,
};

/// Argon2id with the crate's default cost parameters.
///
/// Digests are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
/// salt and cost travel with each stored digest and older rows keep verifying
/// after the defaults change.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &str) -> Result<PasswordDigest, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| DomainError::PasswordHashing(format!("hash password: {e}")))?;

        Ok(PasswordDigest::new(phc.to_string()))
    }

    /// `Ok(false)` on a wrong password; `Err` only when the stored digest is unusable.
    fn verify(&self, plain_password: &str, digest: &PasswordDigest) -> Result<bool, DomainError> {
        let stored = PasswordHash::new(digest.as_str())
            .map_err(|e| DomainError::PasswordHashing(format!("parse stored digest: {e}")))?;

        match self.argon2.verify_password(plain_password.as_bytes(), &stored) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::PasswordHashing(format!("verify password: {e}"))),
        }
    }
}
