use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{CreateTodoRequest, Pagination, Todo, TodoQuery, UpdateTodoRequest},
    store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Retrieves a page of the authenticated user's todos.
///
/// ## Query Parameters:
/// - `completed` (optional): exact-match filter on completion state.
/// - `priority` (optional): exact-match filter, one of "low", "medium", "high".
/// - `sort` (optional): field name, `-` prefix for descending; default `-createdAt`.
/// - `page` (optional): 1-based page number, default 1.
/// - `limit` (optional): page size 1-100, default 20.
///
/// The `total` in the pagination metadata counts all rows matching the
/// filter, so a page past the end returns empty `todos` with unchanged
/// metadata rather than an error.
#[get("")]
pub async fn get_todos(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    query: web::Query<TodoQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let (todos, total) = store::todos::find_many(&pool, user_id.0, &query).await?;
    let pagination = Pagination::new(query.page(), query.limit(), total);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "todos": todos, "pagination": pagination }
    })))
}

/// Creates a new todo owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1-200 characters.
/// - `description` (optional): up to 1000 characters.
/// - `priority` (optional): defaults to "medium".
/// - `dueDate` (optional): RFC 3339 timestamp.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    body: web::Json<CreateTodoRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let input = body.into_inner();
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required.".into()));
    }

    let todo = store::todos::create(&pool, &Todo::new(input, user_id.0)).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Todo created successfully.",
        "data": { "todo": todo }
    })))
}

/// Per-owner aggregate counts: total, completed, pending, and one bucket
/// per priority. A user with no todos gets all zeros.
#[get("/stats")]
pub async fn get_stats(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let stats = store::todos::stats(&pool, user_id.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "stats": stats }
    })))
}

/// Deletes all of the caller's completed todos, reporting how many went.
#[delete("/completed")]
pub async fn delete_completed(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let deleted = store::todos::delete_completed(&pool, user_id.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("{} completed todo(s) deleted.", deleted),
        "data": { "deletedCount": deleted }
    })))
}

/// Retrieves a single todo by id.
///
/// A todo owned by another user is reported as 404, identical to a missing
/// id, so ownership cannot be inferred from error codes.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = store::todos::find_one(&pool, user_id.0, todo_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found.".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "todo": todo }
    })))
}

/// Partially updates a todo.
///
/// Only fields present in the body change; `"completed": false` is a real
/// write, distinct from leaving the field out.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
    body: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if matches!(&body.title, Some(t) if t.trim().is_empty()) {
        return Err(AppError::BadRequest("Title cannot be empty.".into()));
    }

    let todo = store::todos::update(&pool, user_id.0, todo_id.into_inner(), &body)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found.".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Todo updated successfully.",
        "data": { "todo": todo }
    })))
}

/// Flips a todo's completion flag in one atomic statement.
#[patch("/{id}/toggle")]
pub async fn toggle_todo(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let todo = store::todos::toggle(&pool, user_id.0, todo_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found.".into()))?;

    let message = if todo.completed {
        "Todo marked as completed."
    } else {
        "Todo marked as incomplete."
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "data": { "todo": todo }
    })))
}

/// Deletes a todo owned by the caller.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let deleted = store::todos::delete(&pool, user_id.0, todo_id.into_inner()).await?;

    if !deleted {
        return Err(AppError::NotFound("Todo not found.".into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Todo deleted successfully."
    })))
}
