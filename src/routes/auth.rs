use crate::{
    auth::{
        generate_token, hash_password, verify_password, AuthenticatedUserId,
        ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
    },
    error::AppError,
    models::user::normalize_email,
    store,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user.
///
/// Normalizes the email, rejects a taken address, stores the bcrypt digest
/// and returns the new user together with a fresh token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let email = normalize_email(&body.email);

    if store::users::email_taken(&pool, &email, None).await? {
        return Err(AppError::BadRequest("Email already registered.".into()));
    }

    let password_hash = hash_password(&body.password)?;

    // Two concurrent registrations can pass the email check; the unique
    // index is the authority, so map its violation to the same error.
    let user = store::users::create(&pool, body.name.trim(), &email, &password_hash)
        .await
        .map_err(|e| AppError::bad_request_on_unique_violation(e, "Email already registered."))?;

    let token = generate_token(user.id)?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Registration successful.",
        "data": { "user": user.into_user(), "token": token }
    })))
}

/// Login user.
///
/// An unknown email and a wrong password return the identical 401 response,
/// so callers cannot tell which addresses are registered.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let email = normalize_email(&body.email);
    let user = store::users::find_by_email(&pool, &email).await?;

    let user = match user {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => return Err(AppError::Unauthorized("Invalid email or password.".into())),
    };

    let token = generate_token(user.id)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful.",
        "data": { "user": user.into_user(), "token": token }
    })))
}

/// Returns the authenticated user's profile.
#[get("/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = store::users::find_by_id(&pool, user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "user": user.into_user() }
    })))
}

/// Partially updates the caller's name and/or email.
#[put("/profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    body: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let email = body.email.as_deref().map(normalize_email);

    // A new email must be free, not counting the caller's own row.
    if let Some(email) = &email {
        if store::users::email_taken(&pool, email, Some(user_id.0)).await? {
            return Err(AppError::BadRequest("Email already in use.".into()));
        }
    }

    // The pre-check above can race with a concurrent claim of the same
    // email; the unique index closes that window.
    let name = body.name.as_deref().map(str::trim);
    let user = store::users::update_profile(&pool, user_id.0, name, email.as_deref())
        .await
        .map_err(|e| AppError::bad_request_on_unique_violation(e, "Email already in use."))?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully.",
        "data": { "user": user.into_user() }
    })))
}

/// Changes the caller's password after verifying the current one, and
/// issues a fresh token. Previously issued tokens stay valid until their
/// natural expiry.
#[put("/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    body: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = store::users::find_by_id(&pool, user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".into()))?;

    if !verify_password(&body.current_password, &user.password_hash) {
        return Err(AppError::BadRequest("Current password is incorrect.".into()));
    }

    let password_hash = hash_password(&body.new_password)?;
    store::users::update_password(&pool, user_id.0, &password_hash).await?;

    let token = generate_token(user_id.0)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password changed successfully.",
        "data": { "token": token }
    })))
}
