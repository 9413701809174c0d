use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public representation of a user account, as returned by the API.
///
/// Deliberately has no password field; the stored digest lives only on
/// [`UserRecord`] and is never serialized outward.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Internal row shape including the bcrypt digest.
///
/// Only the store and the auth handlers see this type; responses are built
/// from the [`User`] it converts into.
#[derive(Debug, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lowercases and trims an email address. Every email comparison and write
/// goes through this, so the unique index on `users.email` sees one casing.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
