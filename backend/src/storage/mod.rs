//! # Storage Module
//!
//! Handles all data persistence for the finance tracker.
//!
//! The domain layer talks to storage exclusively through the traits defined
//! here; the SQLite implementation can be swapped without touching any
//! business logic. Every SQL statement in the crate is a parameterized query
//! owned by a repository in this module; user input is always bound, never
//! interpolated.

pub mod sqlite;
pub mod traits;

pub use sqlite::DbConnection;
pub use traits::{BudgetStorage, Connection, TransactionStorage, UserStorage};
