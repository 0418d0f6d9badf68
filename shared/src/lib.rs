use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a transaction adds to or draws from the user's funds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }

    /// Parse the stored label back into a kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Income" => Some(TransactionKind::Income),
            "Expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single income or expense entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Persisted row id (creation order)
    pub id: i64,
    pub kind: TransactionKind,
    /// Exact amount, never negative
    pub amount: Decimal,
    /// Free-form category label
    pub category: String,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
}

/// Whether spending stayed within a budget's monthly limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetHealth {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "EXCEEDED!")]
    Exceeded,
}

impl BudgetHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetHealth::Ok => "OK",
            BudgetHealth::Exceeded => "EXCEEDED!",
        }
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One budget's standing for the current calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatusRow {
    pub category: String,
    /// Monthly limit set by the user
    pub limit: Decimal,
    /// Expense total for the month in this category
    pub spent: Decimal,
    /// `limit - spent`; negative once the limit is blown
    pub remaining: Decimal,
    pub status: BudgetHealth,
}

/// The dashboard's three headline figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_savings: Decimal,
}

/// Account details shown on the settings screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: Option<String>,
}

/// Form input for recording a new transaction
///
/// Amount and date arrive as the raw text the user typed; validation
/// happens in the mutation service, not at the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTransactionRequest {
    pub kind: TransactionKind,
    pub amount: String,
    pub category: String,
    pub occurred_on: String,
    pub note: Option<String>,
}

/// Form input for creating a new account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    /// Optional contact address; blank means none
    pub email: String,
}

/// Form input for the self-service password reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetSecretRequest {
    pub username: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Form input for changing the signed-in user's password
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Form input for setting a category's monthly limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertBudgetRequest {
    pub category: String,
    /// Raw text the user typed for the limit
    pub limit: String,
}

/// Pagination window for the transaction listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionListQuery {
    /// Maximum number of rows to return; unset means all
    pub limit: Option<u32>,
    /// Number of rows to skip from the top of the ordering
    pub offset: Option<u32>,
}

/// Convert an exact amount to whole cents
///
/// Returns `None` when the amount carries more than two decimal places
/// or does not fit in an `i64` of cents.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    let normalized = amount.normalize();
    if normalized.scale() > 2 {
        return None;
    }
    normalized.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Rebuild the exact amount from whole cents
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Render an amount as `#,##0.00` for display
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let cents = (rounded.abs() * Decimal::ONE_HUNDRED).to_i64().unwrap_or(0);
    let sign = if rounded.is_sign_negative() && cents != 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
