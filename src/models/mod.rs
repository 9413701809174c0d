pub mod todo;
pub mod user;

pub use todo::{
    CreateTodoRequest, Pagination, SortSpec, Todo, TodoPriority, TodoQuery, TodoStats,
    UpdateTodoRequest,
};
pub use user::{User, UserRecord};
