//! Write-side operations: recording and deleting transactions, setting
//! budgets, and the account lifecycle (signup, password reset, password
//! change).
//!
//! Form input arrives as raw text and is validated here before anything
//! touches the store. Scoped operations resolve the acting user from the
//! session; signup and self-service reset run without one.
//!
//! Handles and emails are trimmed; secrets are hashed exactly as typed,
//! so the byte sequence entered at signup is the one `authenticate`
//! verifies. Trimming a secret only ever feeds its blank check.

use log::info;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use shared::{
    to_cents, ChangePasswordRequest, RecordTransactionRequest, ResetSecretRequest, SignupRequest,
    UpsertBudgetRequest,
};

use crate::domain::auth_service::{hash_password, AuthService};
use crate::domain::session::Session;
use crate::errors::{Error, Result};
use crate::storage::traits::{
    BudgetStorage, Connection, NewTransaction, TransactionStorage, UserStorage,
};

/// Parse user-typed money text into non-negative cents
fn parse_amount(text: &str) -> Result<i64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return Err(Error::Validation("Please enter an amount".to_string()));
    }
    let amount = Decimal::from_str(&cleaned)
        .map_err(|_| Error::Validation(format!("'{}' is not a valid amount", text.trim())))?;
    if amount.is_sign_negative() {
        return Err(Error::Validation("Amount cannot be negative".to_string()));
    }
    to_cents(amount).ok_or_else(|| Error::Validation("Amounts use at most 2 decimal places".to_string()))
}

/// Parse user-typed limit text into cents. Unlike transaction amounts a
/// limit may be negative.
fn parse_limit(text: &str) -> Result<i64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return Err(Error::Validation("Please enter a limit".to_string()));
    }
    let limit = Decimal::from_str(&cleaned)
        .map_err(|_| Error::Validation(format!("'{}' is not a valid limit", text.trim())))?;
    to_cents(limit).ok_or_else(|| Error::Validation("Limits use at most 2 decimal places".to_string()))
}

/// Service applying all ledger and account mutations
#[derive(Clone)]
pub struct MutationService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    budget_repository: C::BudgetRepository,
    user_repository: C::UserRepository,
    auth_service: AuthService<C>,
}

impl<C: Connection> MutationService<C> {
    pub fn new(connection: Arc<C>, auth_service: AuthService<C>) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        let budget_repository = connection.create_budget_repository();
        let user_repository = connection.create_user_repository();
        Self {
            transaction_repository,
            budget_repository,
            user_repository,
            auth_service,
        }
    }

    /// Record a new transaction for the signed-in user and return its id.
    ///
    /// The amount must parse as a non-negative number and a date must be
    /// present; the date's format itself is left to the store to enforce.
    pub async fn record_transaction(
        &self,
        session: &Session,
        request: RecordTransactionRequest,
    ) -> Result<i64> {
        let actor = session.actor()?;
        let amount_cents = parse_amount(&request.amount)?;

        let occurred_on = request.occurred_on.trim();
        if occurred_on.is_empty() {
            return Err(Error::Validation("Please enter a date".to_string()));
        }

        let id = self
            .transaction_repository
            .insert_transaction(&NewTransaction {
                user_id: actor.user_id,
                kind: request.kind,
                amount_cents,
                category: &request.category,
                note: request.note.as_deref(),
                occurred_on,
            })
            .await?;

        info!(
            "Recorded {} transaction {} ({} cents) for user {}",
            request.kind, id, amount_cents, actor.user_id
        );
        Ok(id)
    }

    /// Delete one of the signed-in user's transactions. An id that does
    /// not exist and an id owned by someone else are indistinguishable:
    /// both delete zero rows and report not found.
    pub async fn delete_transaction(&self, session: &Session, transaction_id: i64) -> Result<()> {
        let actor = session.actor()?;
        let affected = self
            .transaction_repository
            .delete_transaction(actor.user_id, transaction_id)
            .await?;

        if affected == 0 {
            return Err(Error::NotFound(format!(
                "no transaction with id {}",
                transaction_id
            )));
        }

        info!("Deleted transaction {} for user {}", transaction_id, actor.user_id);
        Ok(())
    }

    /// Set the monthly limit for a category, replacing any previous limit
    /// for the same category
    pub async fn upsert_budget(&self, session: &Session, request: UpsertBudgetRequest) -> Result<()> {
        let actor = session.actor()?;
        let limit_cents = parse_limit(&request.limit)?;

        self.budget_repository
            .upsert_budget(actor.user_id, &request.category, limit_cents)
            .await?;

        info!(
            "Set budget '{}' to {} cents for user {}",
            request.category, limit_cents, actor.user_id
        );
        Ok(())
    }

    /// Create a new account. A blank email is stored as absent, not as an
    /// empty string.
    pub async fn create_account(&self, request: SignupRequest) -> Result<i64> {
        let username = request.username.trim();

        if username.is_empty() || request.password.trim().is_empty() {
            return Err(Error::Validation("Username and password are required".to_string()));
        }
        if request.password != request.confirm_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }

        let email = request.email.trim();
        let email = if email.is_empty() { None } else { Some(email) };

        let hash = hash_password(&request.password)?;
        let user_id = self.user_repository.insert_user(username, &hash, email).await?;

        info!("Created account '{}' (id {})", username, user_id);
        Ok(user_id)
    }

    /// Self-service password reset; no session and no old secret required
    pub async fn reset_secret(&self, request: ResetSecretRequest) -> Result<()> {
        let username = request.username.trim();

        if username.is_empty() || request.new_password.trim().is_empty() {
            return Err(Error::Validation("Username and new password are required".to_string()));
        }
        if request.new_password != request.confirm_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }

        let affected = self
            .auth_service
            .change_secret(username, &request.new_password)
            .await?;
        if affected == 0 {
            return Err(Error::NotFound(format!("no account named '{}'", username)));
        }

        info!("Reset password for '{}'", username);
        Ok(())
    }

    /// Change the signed-in user's password after re-verifying the
    /// current one
    pub async fn change_password(
        &self,
        session: &Session,
        request: ChangePasswordRequest,
    ) -> Result<()> {
        let actor = session.actor()?;

        if request.new_password.len() < 4 {
            return Err(Error::Validation(
                "New password must be at least 4 characters".to_string(),
            ));
        }
        if request.new_password != request.confirm_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }

        self.auth_service
            .authenticate(&actor.username, &request.current_password)
            .await?;

        let affected = self
            .auth_service
            .change_secret(&actor.username, &request.new_password)
            .await?;
        if affected == 0 {
            return Err(Error::NotFound(format!("no account named '{}'", actor.username)));
        }

        info!("Changed password for '{}'", actor.username);
        Ok(())
    }
}
