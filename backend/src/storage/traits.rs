//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow the domain
//! layer to depend on narrow capabilities instead of a concrete store. Every
//! SQL statement in the crate lives behind one of these traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Transaction, TransactionKind, TransactionListQuery, UserProfile};

use crate::errors::Result;

/// Credential material looked up for an authentication attempt
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user_id: i64,
    /// The handle exactly as stored
    pub username: String,
    pub password_hash: String,
}

/// Column values for a transaction about to be inserted
///
/// Amounts are whole cents and the date is the raw text the user supplied;
/// a malformed date is the store's to reject, not ours.
#[derive(Debug, Clone)]
pub struct NewTransaction<'a> {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub category: &'a str,
    pub note: Option<&'a str>,
    pub occurred_on: &'a str,
}

/// One budget row joined with its month-to-date expense total, in cents
#[derive(Debug, Clone)]
pub struct BudgetStatusRecord {
    pub category: String,
    pub limit_cents: i64,
    pub spent_cents: i64,
}

/// Trait defining the interface for user account storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a new account and return its assigned id
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<i64>;

    /// Look up the stored credentials for a handle, if the handle exists
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>>;

    /// Fetch the profile fields shown on the settings screen
    async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>>;

    /// Overwrite the stored password hash for a handle
    /// Returns the number of rows affected (zero when the handle is unknown)
    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<u64>;
}

/// Trait defining the interface for transaction storage operations
///
/// Every method is scoped by the owning user id; no call can read or write
/// another user's rows.
#[async_trait]
pub trait TransactionStorage: Send + Sync {
    /// Insert a new transaction and return its assigned id
    async fn insert_transaction(&self, new: &NewTransaction<'_>) -> Result<i64>;

    /// Delete one transaction owned by the given user
    /// Returns the number of rows affected (zero when the id does not exist
    /// or belongs to someone else)
    async fn delete_transaction(&self, user_id: i64, transaction_id: i64) -> Result<u64>;

    /// List transactions ordered by date descending, id descending on ties
    async fn list_transactions(
        &self,
        user_id: i64,
        query: &TransactionListQuery,
    ) -> Result<Vec<Transaction>>;

    /// Sum all amounts of one kind, in cents; zero when no rows match
    async fn sum_by_kind(&self, user_id: i64, kind: TransactionKind) -> Result<i64>;

    /// Expense totals grouped by category, in cents, ordered by category
    async fn expense_totals_by_category(&self, user_id: i64) -> Result<Vec<(String, i64)>>;
}

/// Trait defining the interface for budget storage operations
#[async_trait]
pub trait BudgetStorage: Send + Sync {
    /// Insert or replace the monthly limit for a (user, category) pair
    async fn upsert_budget(&self, user_id: i64, category: &str, limit_cents: i64) -> Result<()>;

    /// Every budget owned by the user with its expense total over the given
    /// date window (inclusive), ordered by category. Budgets with no
    /// matching transactions still appear with a zero total.
    async fn month_status(
        &self,
        user_id: i64,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<BudgetStatusRecord>>;
}

/// Trait defining the interface for storage connections
///
/// This abstracts away the concrete connection type and provides factory
/// methods for creating repositories, so domain services can work with any
/// storage backend.
pub trait Connection: Send + Sync + Clone {
    /// The type of UserStorage this connection creates
    type UserRepository: UserStorage + Clone;

    /// The type of TransactionStorage this connection creates
    type TransactionRepository: TransactionStorage + Clone;

    /// The type of BudgetStorage this connection creates
    type BudgetRepository: BudgetStorage + Clone;

    /// Create a new user repository for this connection
    fn create_user_repository(&self) -> Self::UserRepository;

    /// Create a new transaction repository for this connection
    fn create_transaction_repository(&self) -> Self::TransactionRepository;

    /// Create a new budget repository for this connection
    fn create_budget_repository(&self) -> Self::BudgetRepository;
}
