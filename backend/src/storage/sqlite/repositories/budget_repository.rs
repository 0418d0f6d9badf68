use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use shared::TransactionKind;

use crate::errors::Result;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{BudgetStatusRecord, BudgetStorage};

/// Repository for budget operations
#[derive(Clone)]
pub struct BudgetRepository {
    db: DbConnection,
}

impl BudgetRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BudgetStorage for BudgetRepository {
    /// Insert or replace the limit for a (user, category) pair
    async fn upsert_budget(&self, user_id: i64, category: &str, limit_cents: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (user_id, category, limit_cents)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, category) DO UPDATE SET limit_cents = excluded.limit_cents
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(limit_cents)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Budgets with their expense totals over a date window
    ///
    /// The join matches transactions to budgets purely on the category
    /// label (plus owner), so a transaction whose category matches no
    /// budget counts toward nothing. Budgets drive the join; one with no
    /// transactions at all still yields a row.
    async fn month_status(
        &self,
        user_id: i64,
        month_start: NaiveDate,
        month_end: NaiveDate,
    ) -> Result<Vec<BudgetStatusRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT b.category, b.limit_cents,
                   COALESCE(SUM(CASE WHEN t.kind = ? AND t.occurred_on BETWEEN ? AND ?
                                     THEN t.amount_cents ELSE 0 END), 0) AS spent_cents
            FROM budgets b
            LEFT JOIN transactions t ON t.category = b.category AND t.user_id = b.user_id
            WHERE b.user_id = ?
            GROUP BY b.category, b.limit_cents
            ORDER BY b.category ASC
            "#,
        )
        .bind(TransactionKind::Expense.as_str())
        .bind(month_start)
        .bind(month_end)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| BudgetStatusRecord {
                category: row.get("category"),
                limit_cents: row.get("limit_cents"),
                spent_cents: row.get("spent_cents"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::{Connection, NewTransaction, TransactionStorage, UserStorage};

    async fn setup_test() -> (DbConnection, BudgetRepository) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let repo = BudgetRepository::new(db.clone());
        (db, repo)
    }

    async fn seed_user(db: &DbConnection, username: &str) -> i64 {
        db.create_user_repository()
            .insert_user(username, "hash", None)
            .await
            .expect("Failed to seed user")
    }

    async fn seed_expense(db: &DbConnection, user_id: i64, cents: i64, category: &str, date: &str) {
        db.create_transaction_repository()
            .insert_transaction(&NewTransaction {
                user_id,
                kind: TransactionKind::Expense,
                amount_cents: cents,
                category,
                note: None,
                occurred_on: date,
            })
            .await
            .expect("Failed to seed transaction");
    }

    fn june_window() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
        )
    }

    #[tokio::test]
    async fn test_budget_with_no_transactions_still_appears() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Groceries", 100_00).await.expect("upsert");

        let status = repo.month_status(user, start, end).await.expect("status");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].category, "Groceries");
        assert_eq!(status[0].limit_cents, 100_00);
        assert_eq!(status[0].spent_cents, 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_limit() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Rent", 500_00).await.expect("upsert");
        repo.upsert_budget(user, "Rent", 500_00).await.expect("upsert");
        repo.upsert_budget(user, "Rent", 650_00).await.expect("upsert");

        let status = repo.month_status(user, start, end).await.expect("status");
        assert_eq!(status.len(), 1, "repeated upserts must not create extra rows");
        assert_eq!(status[0].limit_cents, 650_00);
    }

    #[tokio::test]
    async fn test_month_status_sums_only_window_expenses() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Food", 200_00).await.expect("upsert");
        seed_expense(&db, user, 80_00, "Food", "2025-06-10").await;
        seed_expense(&db, user, 45_50, "Food", "2025-06-30").await;
        // Outside the window
        seed_expense(&db, user, 999_00, "Food", "2025-05-31").await;
        seed_expense(&db, user, 999_00, "Food", "2025-07-01").await;

        let status = repo.month_status(user, start, end).await.expect("status");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].spent_cents, 125_50);
    }

    #[tokio::test]
    async fn test_month_status_ignores_income_rows() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Food", 200_00).await.expect("upsert");
        db.create_transaction_repository()
            .insert_transaction(&NewTransaction {
                user_id: user,
                kind: TransactionKind::Income,
                amount_cents: 500_00,
                category: "Food",
                note: None,
                occurred_on: "2025-06-10",
            })
            .await
            .expect("insert");

        let status = repo.month_status(user, start, end).await.expect("status");
        assert_eq!(status[0].spent_cents, 0);
    }

    #[tokio::test]
    async fn test_month_status_is_scoped_to_owner() {
        let (db, repo) = setup_test().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;
        let (start, end) = june_window();

        repo.upsert_budget(alice, "Food", 200_00).await.expect("upsert");
        repo.upsert_budget(bob, "Food", 300_00).await.expect("upsert");
        seed_expense(&db, bob, 250_00, "Food", "2025-06-10").await;

        let status = repo.month_status(alice, start, end).await.expect("status");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].limit_cents, 200_00);
        assert_eq!(status[0].spent_cents, 0, "another user's spending must not count");
    }

    #[tokio::test]
    async fn test_mistyped_transaction_category_counts_toward_nothing() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Groceries", 200_00).await.expect("upsert");
        // Label match is exact; this spelling belongs to no budget
        seed_expense(&db, user, 150_00, "Grocries", "2025-06-10").await;

        let status = repo.month_status(user, start, end).await.expect("status");
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].spent_cents, 0);
    }

    #[tokio::test]
    async fn test_month_status_orders_by_category() {
        let (db, repo) = setup_test().await;
        let user = seed_user(&db, "alice").await;
        let (start, end) = june_window();

        repo.upsert_budget(user, "Travel", 100_00).await.expect("upsert");
        repo.upsert_budget(user, "Food", 200_00).await.expect("upsert");
        repo.upsert_budget(user, "Rent", 900_00).await.expect("upsert");

        let status = repo.month_status(user, start, end).await.expect("status");
        let categories: Vec<&str> = status.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Food", "Rent", "Travel"]);
    }
}
