use crate::auth::password::PasswordHash;
use chrono::{DateTime, Utc};

/// A registered account. Never serialized directly; responses only expose the email.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet.
///
/// The password is already hashed: a plaintext password cannot reach the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: PasswordHash,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password_hash: PasswordHash) -> Self {
        Self {
            email: email.into(),
            password_hash,
        }
    }
}
