use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use shared::{from_cents, Transaction, TransactionKind, TransactionListQuery};

use crate::errors::{Error, Result};
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{NewTransaction, TransactionStorage};

/// Repository for transaction operations
#[derive(Clone)]
pub struct TransactionRepository {
    db: DbConnection,
}

impl TransactionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_transaction(row: &SqliteRow) -> Result<Transaction> {
        let kind: String = row.get("kind");
        let kind = TransactionKind::parse(&kind).ok_or_else(|| {
            Error::Store(sqlx::Error::Decode(
                format!("unrecognized transaction kind: {kind}").into(),
            ))
        })?;

        Ok(Transaction {
            id: row.get("id"),
            kind,
            amount: from_cents(row.get("amount_cents")),
            category: row.get("category"),
            note: row.get("note"),
            occurred_on: row.get("occurred_on"),
        })
    }
}

#[async_trait]
impl TransactionStorage for TransactionRepository {
    /// Insert a transaction row
    ///
    /// The date is bound as the raw text it arrived in; the column CHECK
    /// rejects anything that is not a canonical calendar date.
    async fn insert_transaction(&self, new: &NewTransaction<'_>) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, kind, amount_cents, category, note, occurred_on)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(new.amount_cents)
        .bind(new.category)
        .bind(new.note)
        .bind(new.occurred_on)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Delete one transaction; ownership is part of the predicate
    async fn delete_transaction(&self, user_id: i64, transaction_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM transactions
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(transaction_id)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }

    /// List the user's transactions, most recent date first, newest entry
    /// first within a date
    async fn list_transactions(
        &self,
        user_id: i64,
        query: &TransactionListQuery,
    ) -> Result<Vec<Transaction>> {
        // SQLite reads LIMIT -1 as "no limit"
        let limit = query.limit.map(i64::from).unwrap_or(-1);
        let offset = query.offset.map(i64::from).unwrap_or(0);

        let rows = sqlx::query(
            r#"
            SELECT id, kind, amount_cents, category, note, occurred_on
            FROM transactions
            WHERE user_id = ?
            ORDER BY occurred_on DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::map_transaction).collect()
    }

    /// Sum amounts of one kind for a user, in cents
    async fn sum_by_kind(&self, user_id: i64, kind: TransactionKind) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS total
            FROM transactions
            WHERE user_id = ? AND kind = ?
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("total"))
    }

    /// Expense totals per category, in cents
    async fn expense_totals_by_category(&self, user_id: i64) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COALESCE(SUM(amount_cents), 0) AS total
            FROM transactions
            WHERE user_id = ? AND kind = ?
            GROUP BY category
            ORDER BY category ASC
            "#,
        )
        .bind(user_id)
        .bind(TransactionKind::Expense.as_str())
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("category"), row.get("total")))
            .collect())
    }
}
