//! The `todoforge` library crate.
//!
//! Contains the domain models, authentication mechanisms (bcrypt password
//! hashing, JWT issuance/verification, request guard), the sqlx persistence
//! layer, routing configuration, and error handling for the todo-list API.
//! The binary (`main.rs`) wires these together into a running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
