use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::errors::Result;
use crate::storage::sqlite::repositories::{BudgetRepository, TransactionRepository, UserRepository};
use crate::storage::traits::Connection;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:budget_buddy.db";

/// DbConnection manages database access for all repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Create users table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create transactions table. The date CHECK only admits canonical
        // YYYY-MM-DD text, so malformed dates fail here rather than later.
        // `IS` instead of `=`: date() returns NULL for unparseable text, and
        // a NULL check result would otherwise pass the constraint.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                kind TEXT NOT NULL CHECK (kind IN ('Income', 'Expense')),
                amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
                category TEXT NOT NULL,
                note TEXT,
                occurred_on TEXT NOT NULL CHECK (date(occurred_on) IS occurred_on)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for the listing order (date descending, newest id first)
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_date
            ON transactions(user_id, occurred_on DESC, id DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // Create budgets table, one row per (user, category)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                user_id INTEGER NOT NULL REFERENCES users(id),
                category TEXT NOT NULL,
                limit_cents INTEGER NOT NULL,
                PRIMARY KEY (user_id, category)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type UserRepository = UserRepository;
    type TransactionRepository = TransactionRepository;
    type BudgetRepository = BudgetRepository;

    fn create_user_repository(&self) -> UserRepository {
        UserRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_budget_repository(&self) -> BudgetRepository {
        BudgetRepository::new(self.clone())
    }
}
