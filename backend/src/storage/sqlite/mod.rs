//! # SQLite Storage Module
//!
//! SQLite-backed implementations of the storage traits.
//!
//! ## Components
//!
//! - **connection.rs** - database connection and schema management
//! - **repositories/** - one repository per entity, owning its SQL

pub mod connection;
pub mod repositories;

// Re-export the main types for external use
pub use connection::DbConnection;
pub use repositories::{BudgetRepository, TransactionRepository, UserRepository};
