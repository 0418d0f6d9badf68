//! Crate-wide error taxonomy.
//!
//! Every failure a service or repository can produce is classified into one
//! of these variants, and each variant maps to exactly one user-facing
//! message category so the presentation layer can pick a dialog style
//! without knowing the store's native error vocabulary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing user input; recoverable by re-prompting
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch or unknown handle. One message for both, so
    /// callers cannot learn which half was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A session-scoped operation ran with no signed-in user
    #[error("no user is signed in")]
    SessionRequired,

    /// Unique-constraint violation, e.g. a taken username at signup
    #[error("username already exists, please choose another")]
    Duplicate,

    /// The mutation or query target does not exist (or is not owned by
    /// the acting user, which reads the same from the outside)
    #[error("{0}")]
    NotFound(String),

    /// Connection or statement execution failure; never retried here
    #[error("data access failed: {0}")]
    Store(sqlx::Error),

    /// A failure that should not happen in normal operation
    #[error("internal error: {0}")]
    Internal(String),
}

/// User-facing grouping for error presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Input,
    Auth,
    Data,
}

impl Error {
    pub fn message_category(&self) -> MessageCategory {
        match self {
            Error::Validation(_) | Error::Duplicate => MessageCategory::Input,
            Error::InvalidCredentials | Error::SessionRequired => MessageCategory::Auth,
            Error::NotFound(_) | Error::Store(_) | Error::Internal(_) => MessageCategory::Data,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
                return Error::Duplicate;
            }
        }
        Error::Store(err)
    }
}
