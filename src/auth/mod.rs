pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::TaskSummary;

// Re-export necessary items
pub use extractors::Principal;
pub use middleware::AuthMiddleware;
pub use password::{PasswordHash, PasswordHasher};
pub use token::{Claims, TokenIssuer};

/// Represents the payload for a user login request.
///
/// Deliberately unvalidated: any email that does not match an account is simply
/// an authentication failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password for the new account.
    /// Must not be empty.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Response envelope after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub data: AuthData,
}

/// Identity and bearer token handed back to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthData {
    pub email: String,
    /// The JWT (JSON Web Token) to present as `Authorization: Bearer <token>`.
    pub token: String,
    /// The user's tasks; only present in login responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskSummary>>,
}
