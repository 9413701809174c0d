use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    /// Low priority.
    Low,
    /// Medium priority. The default for new todos.
    Medium,
    /// High priority.
    High,
}

impl Default for TodoPriority {
    fn default() -> Self {
        TodoPriority::Medium
    }
}

/// Represents a todo entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    /// The title of the todo.
    pub title: String,
    /// An optional description.
    pub description: Option<String>,
    /// Whether the todo has been completed. Defaults to `false`.
    pub completed: bool,
    /// The priority of the todo.
    pub priority: TodoPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Timestamp of when the todo was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the todo. Immutable after creation.
    pub user_id: i32,
}

/// Input structure for creating a todo.
/// Contains validation rules for its fields.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    /// The title of the todo. Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    /// An optional description, at most 1000 characters.
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    /// The priority of the todo. Defaults to medium when omitted.
    pub priority: Option<TodoPriority>,

    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Input structure for partially updating a todo.
///
/// Every field is optional: an omitted field leaves the stored value
/// untouched, while a present field overwrites it. In particular
/// `completed: Some(false)` is distinct from leaving `completed` out.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub priority: Option<TodoPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

impl Todo {
    /// Creates a new `Todo` from a validated `CreateTodoRequest` and its owner.
    ///
    /// Trims the title and description, applies the medium-priority and
    /// not-completed defaults, and stamps `created_at`/`updated_at`.
    pub fn new(input: CreateTodoRequest, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            completed: false,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }
}

/// Query parameters accepted by the todo list endpoint.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoQuery {
    /// Filter by completion state (exact match).
    pub completed: Option<bool>,
    /// Filter by priority (exact match).
    pub priority: Option<TodoPriority>,
    /// Sort key; a leading `-` means descending. Defaults to `-createdAt`.
    pub sort: Option<String>,
    /// 1-based page number.
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: Option<i64>,
    /// Page size, between 1 and 100.
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

/// A parsed sort order: a whitelisted column name plus direction.
///
/// The column is one of a fixed set of static strings, so it is safe to
/// splice into an `ORDER BY` clause; raw client input never reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub descending: bool,
}

impl SortSpec {
    pub fn order_by(&self) -> String {
        format!(
            "{} {}",
            self.column,
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

fn parse_sort(raw: &str) -> SortSpec {
    let (descending, field) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let column = match field {
        "createdAt" | "created_at" => "created_at",
        "updatedAt" | "updated_at" => "updated_at",
        "dueDate" | "due_date" => "due_date",
        "title" => "title",
        "priority" => "priority",
        "completed" => "completed",
        // Unknown fields fall back to the default ordering rather than erroring.
        _ => {
            return SortSpec {
                column: "created_at",
                descending: true,
            }
        }
    };
    SortSpec { column, descending }
}

impl TodoQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn sort(&self) -> SortSpec {
        parse_sort(self.sort.as_deref().unwrap_or("-createdAt"))
    }
}

/// Pagination metadata returned alongside a page of todos.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// `pages` is `ceil(total / limit)`; an empty result set has zero pages.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Per-owner aggregate counts over the todos table.
#[derive(Debug, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}
