use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a plaintext password with bcrypt (cost 12).
///
/// bcrypt salts internally, so hashing the same plaintext twice yields
/// different digests.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, 12).map_err(|e| {
        // The bcrypt error is logged without the plaintext or digest.
        log::error!("password hashing failed: {}", e);
        AppError::InternalServerError("Failed to hash password".into())
    })
}

/// Verifies a plaintext password against a stored bcrypt digest.
///
/// A malformed digest is treated as a failed match rather than an error, so
/// callers get a plain boolean.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}
