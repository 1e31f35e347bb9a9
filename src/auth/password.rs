use crate::error::AppError;
use bcrypt::{hash, verify};
use std::fmt;

/// A bcrypt hash of a user's password.
///
/// Only `PasswordHasher::hash` and the store (when loading a persisted row) create
/// values of this type, and `hash` never accepts one as input, so a stored hash
/// cannot be hashed a second time.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps a hash read back from durable storage.
    pub fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// Hashes and verifies passwords with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<PasswordHash, AppError> {
        Ok(PasswordHash(hash(password, self.cost)?))
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A stored value that is not a valid bcrypt hash never matches.
    pub fn verify(&self, password: &str, hashed: &PasswordHash) -> bool {
        match verify(password, hashed.as_str()) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost keeps the tests fast.
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hasher().hash(password).unwrap();

        assert_ne!(hashed.as_str(), password);
        assert!(hasher().verify(password, &hashed));
        assert!(!hasher().verify("wrong_password", &hashed));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hasher().hash("secret123").unwrap();
        let second = hasher().hash("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let bogus = PasswordHash::from_stored("invalidhashformat".to_string());
        assert!(!hasher().verify("test_password123", &bogus));
    }

    #[test]
    fn test_debug_does_not_leak_hash() {
        let hashed = hasher().hash("secret123").unwrap();
        assert_eq!(format!("{:?}", hashed), "PasswordHash(***)");
    }

    #[test]
    fn test_invalid_cost_is_an_internal_error() {
        let result = PasswordHasher::new(2).hash("secret123");
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
