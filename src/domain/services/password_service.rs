use crate::domain::{error::DomainError, models::password::PasswordDigest};

/// Service for hashing and verifying passwords
pub trait PasswordHasher: Clone + Send + Sync {
    /// Hash a plain text password into a salted digest
    fn hash(&self, plain_password: &str) -> Result<PasswordDigest, DomainError>;

    /// Verify a plain text password against a stored digest
    fn verify(&self, plain_password: &str, digest: &PasswordDigest) -> Result<bool, DomainError>;
}
