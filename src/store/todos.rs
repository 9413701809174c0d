use crate::models::{Todo, TodoQuery, TodoStats, UpdateTodoRequest};
use sqlx::PgPool;
use uuid::Uuid;

const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, created_at, updated_at, user_id";

pub async fn create(pool: &PgPool, todo: &Todo) -> Result<Todo, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "INSERT INTO todos (id, title, description, completed, priority, due_date, created_at, updated_at, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(todo.id)
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.completed)
    .bind(todo.priority)
    .bind(todo.due_date)
    .bind(todo.created_at)
    .bind(todo.updated_at)
    .bind(todo.user_id)
    .fetch_one(pool)
    .await
}

pub async fn find_one(
    pool: &PgPool,
    user_id: i32,
    id: Uuid,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
        TODO_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Fetches a page of the owner's todos plus the total count matching the
/// filter before pagination (the caller needs it for page metadata).
///
/// Filter conditions are appended dynamically with numbered parameters; the
/// ORDER BY column comes from the `SortSpec` whitelist, never from raw input.
pub async fn find_many(
    pool: &PgPool,
    user_id: i32,
    query: &TodoQuery,
) -> Result<(Vec<Todo>, i64), sqlx::Error> {
    let mut conditions = String::from("user_id = $1");
    let mut param_count = 2;

    if query.completed.is_some() {
        conditions.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }
    if query.priority.is_some() {
        conditions.push_str(&format!(" AND priority = ${}", param_count));
        param_count += 1;
    }

    let list_sql = format!(
        "SELECT {} FROM todos WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
        TODO_COLUMNS,
        conditions,
        query.sort().order_by(),
        param_count,
        param_count + 1,
    );
    let count_sql = format!("SELECT COUNT(*) FROM todos WHERE {}", conditions);

    let mut list_query = sqlx::query_as::<_, Todo>(&list_sql).bind(user_id);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);

    if let Some(completed) = query.completed {
        list_query = list_query.bind(completed);
        count_query = count_query.bind(completed);
    }
    if let Some(priority) = query.priority {
        list_query = list_query.bind(priority);
        count_query = count_query.bind(priority);
    }

    let todos = list_query
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(pool)
        .await?;
    let total = count_query.fetch_one(pool).await?;

    Ok((todos, total))
}

/// Partial update; `None` fields keep their stored value via COALESCE, so
/// `completed = Some(false)` genuinely writes `false` while an omitted
/// `completed` leaves the row untouched.
pub async fn update(
    pool: &PgPool,
    user_id: i32,
    id: Uuid,
    changes: &UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "UPDATE todos
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             completed = COALESCE($3, completed),
             priority = COALESCE($4, priority),
             due_date = COALESCE($5, due_date),
             updated_at = NOW()
         WHERE id = $6 AND user_id = $7
         RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(changes.title.as_deref().map(str::trim))
    .bind(changes.description.as_deref().map(str::trim))
    .bind(changes.completed)
    .bind(changes.priority)
    .bind(changes.due_date)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Flips the completion flag in a single statement, so two racing toggles
/// each observe a consistent read-modify-write.
pub async fn toggle(
    pool: &PgPool,
    user_id: i32,
    id: Uuid,
) -> Result<Option<Todo>, sqlx::Error> {
    sqlx::query_as::<_, Todo>(&format!(
        "UPDATE todos
         SET completed = NOT completed, updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        TODO_COLUMNS
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, user_id: i32, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_completed(pool: &PgPool, user_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM todos WHERE user_id = $1 AND completed = TRUE")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Single aggregate scan over the owner's todos. With no rows every count
/// is zero; `completed + pending` and the three priority buckets each sum
/// to `total`.
pub async fn stats(pool: &PgPool, user_id: i32) -> Result<TodoStats, sqlx::Error> {
    sqlx::query_as::<_, TodoStats>(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE completed) AS completed,
                COUNT(*) FILTER (WHERE NOT completed) AS pending,
                COUNT(*) FILTER (WHERE priority = 'high') AS high_priority,
                COUNT(*) FILTER (WHERE priority = 'medium') AS medium_priority,
                COUNT(*) FILTER (WHERE priority = 'low') AS low_priority
         FROM todos WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
