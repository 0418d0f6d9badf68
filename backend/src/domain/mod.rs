//! # Domain Module
//!
//! Contains all business logic for the finance tracker.
//!
//! This module holds the session state, the navigation state machine, and
//! the services that implement authentication, ledger queries, and
//! mutations. It operates independently of any specific UI and talks to
//! persistence only through the storage traits.
//!
//! ## Module Organization
//!
//! - **session**: Who is signed in; the single place the acting user id lives
//! - **navigation**: Pure view-transition rules plus the stateful navigator
//! - **auth_service**: Credential verification and password hashing
//! - **ledger_service**: Read-side aggregates, listings, and profile lookup
//! - **mutation_service**: Transaction/budget writes and the account lifecycle
//!
//! ## Business Rules
//!
//! - Every read and write is scoped to the signed-in user's rows
//! - Monetary amounts are validated from text and stored as exact cents
//! - Secrets are stored only as salted hashes, never as plain text
//! - Signing out always lands on the login view and clears the session

pub mod auth_service;
pub mod ledger_service;
pub mod mutation_service;
pub mod navigation;
pub mod session;

pub use auth_service::AuthService;
pub use ledger_service::LedgerService;
pub use mutation_service::MutationService;
pub use navigation::{ActiveView, MenuItem, NavEvent, Navigator};
pub use session::{Actor, Session, NO_USER};
