//! Read-side queries over the signed-in user's ledger.
//!
//! Every query resolves the acting user from the session first and scopes
//! its SQL to that account; a signed-out session is refused before the
//! store is touched. Totals come back as integer cents from the store and
//! are converted to decimals at this boundary.

use chrono::{Datelike, Local, Months, NaiveDate};
use log::info;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use shared::{
    from_cents, BudgetHealth, BudgetStatusRow, DashboardSummary, Transaction, TransactionKind,
    TransactionListQuery, UserProfile,
};

use crate::domain::session::Session;
use crate::errors::{Error, Result};
use crate::storage::traits::{BudgetStorage, Connection, TransactionStorage, UserStorage};

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next_month| next_month.pred_opt())
        .unwrap_or(start);
    (start, end)
}

/// Service answering aggregate and listing queries for one account
#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    budget_repository: C::BudgetRepository,
    user_repository: C::UserRepository,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        let budget_repository = connection.create_budget_repository();
        let user_repository = connection.create_user_repository();
        Self {
            transaction_repository,
            budget_repository,
            user_repository,
        }
    }

    /// Total of all transactions of one kind, zero when none exist
    pub async fn sum_by_kind(&self, session: &Session, kind: TransactionKind) -> Result<Decimal> {
        let actor = session.actor()?;
        let cents = self
            .transaction_repository
            .sum_by_kind(actor.user_id, kind)
            .await?;
        Ok(from_cents(cents))
    }

    /// Income, expenses, and their difference in one pass
    pub async fn dashboard_summary(&self, session: &Session) -> Result<DashboardSummary> {
        let actor = session.actor()?;
        info!("Building dashboard summary for user {}", actor.user_id);

        let income_cents = self
            .transaction_repository
            .sum_by_kind(actor.user_id, TransactionKind::Income)
            .await?;
        let expense_cents = self
            .transaction_repository
            .sum_by_kind(actor.user_id, TransactionKind::Expense)
            .await?;

        Ok(DashboardSummary {
            total_income: from_cents(income_cents),
            total_expense: from_cents(expense_cents),
            net_savings: from_cents(income_cents - expense_cents),
        })
    }

    /// Per-category expense totals. Categories with no expense rows are
    /// absent rather than reported as zero.
    pub async fn category_breakdown(
        &self,
        session: &Session,
    ) -> Result<BTreeMap<String, Decimal>> {
        let actor = session.actor()?;
        let totals = self
            .transaction_repository
            .expense_totals_by_category(actor.user_id)
            .await?;

        Ok(totals
            .into_iter()
            .map(|(category, cents)| (category, from_cents(cents)))
            .collect())
    }

    /// Every budgeted category with what was spent on it this calendar
    /// month. Spending outside the month window does not count, and a
    /// budget with no matching expenses still shows up with zero spent.
    pub async fn budget_status(&self, session: &Session) -> Result<Vec<BudgetStatusRow>> {
        let actor = session.actor()?;
        let today = Local::now().date_naive();
        let (month_start, month_end) = month_bounds(today);
        info!(
            "Checking budgets for user {} over {} to {}",
            actor.user_id, month_start, month_end
        );

        let records = self
            .budget_repository
            .month_status(actor.user_id, month_start, month_end)
            .await?;
        info!("Found {} budgeted categories", records.len());

        Ok(records
            .into_iter()
            .map(|record| {
                let status = if record.spent_cents > record.limit_cents {
                    BudgetHealth::Exceeded
                } else {
                    BudgetHealth::Ok
                };
                BudgetStatusRow {
                    category: record.category,
                    limit: from_cents(record.limit_cents),
                    spent: from_cents(record.spent_cents),
                    remaining: from_cents(record.limit_cents - record.spent_cents),
                    status,
                }
            })
            .collect())
    }

    /// Newest-first transaction history, optionally windowed
    pub async fn list_transactions(
        &self,
        session: &Session,
        query: &TransactionListQuery,
    ) -> Result<Vec<Transaction>> {
        let actor = session.actor()?;
        let rows = self
            .transaction_repository
            .list_transactions(actor.user_id, query)
            .await?;

        info!("Listed {} transactions for user {}", rows.len(), actor.user_id);
        Ok(rows)
    }

    /// Username and optional email of the signed-in account
    pub async fn profile(&self, session: &Session) -> Result<UserProfile> {
        let actor = session.actor()?;
        self.user_repository
            .get_profile(actor.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no account for user id {}", actor.user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::NewTransaction;
    use crate::storage::DbConnection;
    use rust_decimal_macros::dec;

    async fn setup_test() -> (Arc<DbConnection>, LedgerService<DbConnection>) {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        let service = LedgerService::new(db.clone());
        (db, service)
    }

    async fn seed_user(db: &DbConnection, username: &str) -> i64 {
        db.create_user_repository()
            .insert_user(username, "x", None)
            .await
            .expect("Failed to seed user")
    }

    async fn record(
        db: &DbConnection,
        user_id: i64,
        kind: TransactionKind,
        amount_cents: i64,
        category: &str,
        occurred_on: &str,
    ) {
        db.create_transaction_repository()
            .insert_transaction(&NewTransaction {
                user_id,
                kind,
                amount_cents,
                category,
                note: None,
                occurred_on,
            })
            .await
            .expect("Failed to seed transaction");
    }

    fn session_for(user_id: i64, username: &str) -> Session {
        let mut session = Session::new();
        session.sign_in(user_id, username);
        session
    }

    #[tokio::test]
    async fn test_queries_refuse_a_signed_out_session() {
        let (_db, service) = setup_test().await;
        let session = Session::new();

        let err = service
            .sum_by_kind(&session, TransactionKind::Income)
            .await
            .expect_err("Signed-out sessions must be refused");
        assert!(matches!(err, Error::SessionRequired));

        let err = service
            .budget_status(&session)
            .await
            .expect_err("Signed-out sessions must be refused");
        assert!(matches!(err, Error::SessionRequired));
    }

    #[tokio::test]
    async fn test_sum_by_kind_totals_only_that_kind() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");

        record(&db, user_id, TransactionKind::Income, 350_25, "Salary", "2025-06-01").await;
        record(&db, user_id, TransactionKind::Income, 100_00, "Salary", "2025-06-15").await;
        record(&db, user_id, TransactionKind::Expense, 120_75, "Food", "2025-06-10").await;

        let income = service
            .sum_by_kind(&session, TransactionKind::Income)
            .await
            .expect("Failed to sum income");
        assert_eq!(income, dec!(450.25));
    }

    #[tokio::test]
    async fn test_sum_is_zero_for_an_empty_ledger() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");

        let expense = service
            .sum_by_kind(&session, TransactionKind::Expense)
            .await
            .expect("Failed to sum expenses");
        assert_eq!(expense, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_dashboard_summary_reports_net_savings() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");

        record(&db, user_id, TransactionKind::Income, 500_00, "Salary", "2025-06-01").await;
        record(&db, user_id, TransactionKind::Expense, 123_45, "Food", "2025-06-02").await;

        let summary = service
            .dashboard_summary(&session)
            .await
            .expect("Failed to build summary");
        assert_eq!(summary.total_income, dec!(500.00));
        assert_eq!(summary.total_expense, dec!(123.45));
        assert_eq!(summary.net_savings, dec!(376.55));
    }

    #[tokio::test]
    async fn test_dashboard_summary_is_independent_of_insertion_order() {
        let (db, service) = setup_test().await;
        let oldest_first = seed_user(&db, "alice").await;
        let newest_first = seed_user(&db, "bob").await;

        let entries = [
            (TransactionKind::Income, 250_00, "2025-05-30"),
            (TransactionKind::Expense, 60_00, "2025-06-01"),
            (TransactionKind::Income, 500_00, "2025-06-15"),
            (TransactionKind::Expense, 40_00, "2025-06-20"),
        ];
        for (kind, cents, day) in entries {
            record(&db, oldest_first, kind, cents, "Misc", day).await;
        }
        for (kind, cents, day) in entries.into_iter().rev() {
            record(&db, newest_first, kind, cents, "Misc", day).await;
        }

        let ordered = service
            .dashboard_summary(&session_for(oldest_first, "alice"))
            .await
            .expect("Failed to build summary");
        let scrambled = service
            .dashboard_summary(&session_for(newest_first, "bob"))
            .await
            .expect("Failed to build summary");

        assert_eq!(ordered.total_income, dec!(750.00));
        assert_eq!(ordered.total_expense, dec!(100.00));
        assert_eq!(ordered.net_savings, dec!(650.00));
        assert_eq!(scrambled, ordered);
    }

    #[tokio::test]
    async fn test_category_breakdown_covers_expenses_only() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");

        record(&db, user_id, TransactionKind::Expense, 40_00, "Food", "2025-06-01").await;
        record(&db, user_id, TransactionKind::Expense, 25_50, "Food", "2025-06-08").await;
        record(&db, user_id, TransactionKind::Expense, 900_00, "Rent", "2025-06-01").await;
        record(&db, user_id, TransactionKind::Income, 2_000_00, "Salary", "2025-06-01").await;

        let breakdown = service
            .category_breakdown(&session)
            .await
            .expect("Failed to build breakdown");

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown.get("Food"), Some(&dec!(65.50)));
        assert_eq!(breakdown.get("Rent"), Some(&dec!(900.00)));
        assert!(!breakdown.contains_key("Salary"));
    }

    #[tokio::test]
    async fn test_budget_status_flags_an_exceeded_month() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");
        let today = Local::now().date_naive().to_string();

        db.create_budget_repository()
            .upsert_budget(user_id, "Groceries", 200_00)
            .await
            .expect("Failed to seed budget");
        record(&db, user_id, TransactionKind::Expense, 250_00, "Groceries", &today).await;

        let rows = service
            .budget_status(&session)
            .await
            .expect("Failed to query budget status");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "Groceries");
        assert_eq!(rows[0].limit, dec!(200.00));
        assert_eq!(rows[0].spent, dec!(250.00));
        assert_eq!(rows[0].remaining, dec!(-50.00));
        assert_eq!(rows[0].status, BudgetHealth::Exceeded);
    }

    #[tokio::test]
    async fn test_budget_with_no_spending_this_month_reads_ok() {
        let (db, service) = setup_test().await;
        let user_id = seed_user(&db, "alice").await;
        let session = session_for(user_id, "alice");

        db.create_budget_repository()
            .upsert_budget(user_id, "Travel", 100_00)
            .await
            .expect("Failed to seed budget");
        record(&db, user_id, TransactionKind::Expense, 80_00, "Travel", "2000-01-15").await;

        let rows = service
            .budget_status(&session)
            .await
            .expect("Failed to query budget status");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spent, Decimal::ZERO);
        assert_eq!(rows[0].remaining, dec!(100.00));
        assert_eq!(rows[0].status, BudgetHealth::Ok);
    }

    #[tokio::test]
    async fn test_listing_is_scoped_to_the_signed_in_user() {
        let (db, service) = setup_test().await;
        let alice = seed_user(&db, "alice").await;
        let bob = seed_user(&db, "bob").await;

        record(&db, alice, TransactionKind::Expense, 10_00, "Food", "2025-06-01").await;
        record(&db, bob, TransactionKind::Expense, 99_00, "Games", "2025-06-02").await;

        let listed = service
            .list_transactions(&session_for(alice, "alice"), &TransactionListQuery::default())
            .await
            .expect("Failed to list transactions");

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, "Food");
    }

    #[tokio::test]
    async fn test_profile_returns_username_and_email() {
        let (db, service) = setup_test().await;
        let user_id = db
            .create_user_repository()
            .insert_user("alice", "x", Some("alice@example.com"))
            .await
            .expect("Failed to seed user");

        let profile = service
            .profile(&session_for(user_id, "alice"))
            .await
            .expect("Failed to load profile");
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_profile_for_a_vanished_account_is_not_found() {
        let (_db, service) = setup_test().await;

        let err = service
            .profile(&session_for(999, "ghost"))
            .await
            .expect_err("Missing account must be reported");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_month_bounds_covers_a_mid_year_month() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_month_bounds_handles_a_leap_february() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_month_bounds_rolls_december_into_the_next_year() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }
}
