use async_trait::async_trait;
use sqlx::Row;

use shared::UserProfile;

use crate::errors::Result;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::traits::{StoredCredentials, UserStorage};

/// Repository for user account operations
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    /// Insert a new account row
    ///
    /// A taken username trips the UNIQUE constraint, which the error
    /// conversion classifies as a duplicate.
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get the stored credentials for a handle
    async fn find_credentials(&self, username: &str) -> Result<Option<StoredCredentials>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(StoredCredentials {
                user_id: r.get("id"),
                username: r.get("username"),
                password_hash: r.get("password_hash"),
            })),
            None => Ok(None),
        }
    }

    /// Get the profile fields for a user id
    async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            r#"
            SELECT username, email
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(UserProfile {
                username: r.get("username"),
                email: r.get("email"),
            })),
            None => Ok(None),
        }
    }

    /// Overwrite the password hash for a handle
    async fn update_password_hash(&self, username: &str, password_hash: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?
            WHERE username = ?
            "#,
        )
        .bind(password_hash)
        .bind(username)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }
}
