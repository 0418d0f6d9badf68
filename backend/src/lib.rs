//! # Backend Crate
//!
//! Contains all non-UI logic for the finance tracker.
//!
//! This crate brings together:
//! - **Domain**: Session state, navigation, and the business services
//! - **Storage**: SQLite persistence behind capability traits
//! - **Errors**: The one error type every layer speaks
//!
//! The backend is UI-agnostic: the bundled console shell in `main.rs` is
//! one driver, but the same services could sit behind any other frontend
//! without modification.

pub mod domain;
pub mod errors;
pub mod storage;

pub use errors::{Error, MessageCategory, Result};
