use crate::models::UserRecord;
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// Inserts a new user. The caller is responsible for normalizing the email
/// and hashing the password first.
pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<UserRecord, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Checks whether an email is already registered, optionally excluding one
/// user id (the caller's own row, for profile updates).
pub async fn email_taken(
    pool: &PgPool,
    email: &str,
    exclude_id: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let existing = sqlx::query_as::<_, (i32,)>(
        "SELECT id FROM users WHERE email = $1 AND ($2::INTEGER IS NULL OR id <> $2)",
    )
    .bind(email)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    Ok(existing.is_some())
}

/// Partial profile update; `None` fields keep their stored value.
pub async fn update_profile(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "UPDATE users
         SET name = COALESCE($1, name),
             email = COALESCE($2, email),
             updated_at = NOW()
         WHERE id = $3
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(
    pool: &PgPool,
    id: i32,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
