//! Persistence layer.
//!
//! Thin sqlx query modules over the `users` and `todos` tables. Every
//! function takes the injected `PgPool` explicitly; there is no global
//! connection handle. Todo queries always AND an owner predicate, so a row
//! belonging to another user is indistinguishable from a missing row.

pub mod todos;
pub mod users;
