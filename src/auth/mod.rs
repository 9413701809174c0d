pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::{Validate, ValidationError};

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Rejects values that are empty once trimmed. The length rule alone would
/// accept a whitespace-only name and persist it as an empty string, since
/// the handlers trim before writing.
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.message = Some("Name cannot be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account, 1 to 50 characters.
    #[validate(
        length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,
    /// Email address for the new account. Normalized to lowercase before use.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    /// Password for the new account, at least 6 characters.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for updating the caller's profile. Both fields are optional;
/// an omitted field is left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"),
        custom = "validate_not_blank"
    )]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
}

/// Payload for changing the caller's password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}
