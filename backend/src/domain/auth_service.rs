//! Credential verification and secret management.
//!
//! Secrets are stored as salted argon2 hashes; the plain text never
//! reaches the store. A failed login reports one generic error whether
//! the handle or the secret was wrong.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::storage::traits::{Connection, UserStorage};

/// Hash a secret with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Service for authentication and password updates
#[derive(Clone)]
pub struct AuthService<C: Connection> {
    user_repository: C::UserRepository,
}

impl<C: Connection> AuthService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let user_repository = connection.create_user_repository();
        Self { user_repository }
    }

    /// Verify a username/password pair and return the account id.
    ///
    /// Unknown handles, wrong passwords, and unreadable stored hashes all
    /// come back as the same credentials error.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<i64> {
        let username = username.trim();
        info!("Authenticating '{}'", username);

        let credentials = match self.user_repository.find_credentials(username).await? {
            Some(credentials) => credentials,
            None => {
                info!("Authentication failed for '{}': unknown username", username);
                return Err(Error::InvalidCredentials);
            }
        };

        let parsed = PasswordHash::new(&credentials.password_hash).map_err(|e| {
            warn!("Stored credential for '{}' is unreadable: {}", username, e);
            Error::InvalidCredentials
        })?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            info!("Authentication failed for '{}': password mismatch", username);
            return Err(Error::InvalidCredentials);
        }

        info!("Authentication successful for '{}' (id {})", username, credentials.user_id);
        Ok(credentials.user_id)
    }

    /// Re-hash and overwrite the secret for a handle, returning how many
    /// rows changed. Verifying the old secret first is the caller's job.
    pub async fn change_secret(&self, username: &str, new_password: &str) -> Result<u64> {
        let username = username.trim();
        let hash = hash_password(new_password)?;
        let affected = self
            .user_repository
            .update_password_hash(username, &hash)
            .await?;

        info!("Password update for '{}' affected {} row(s)", username, affected);
        Ok(affected)
    }
}
