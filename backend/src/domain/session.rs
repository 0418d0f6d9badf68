//! The in-process record of who is signed in.
//!
//! One session exists per running process and it is owned by the driver
//! loop; services receive it by reference and never reach for a global.

use crate::errors::{Error, Result};

/// Sentinel id reported while nobody is signed in
pub const NO_USER: i64 = -1;

/// The authenticated identity every scoped query and mutation runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
}

/// Holds the current sign-in state from login until logout or exit.
/// Not synchronized; the single driver thread is the only writer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    actor: Option<Actor>,
}

impl Session {
    pub fn new() -> Self {
        Self { actor: None }
    }

    /// Record a successful authentication
    pub fn sign_in(&mut self, user_id: i64, username: &str) {
        self.actor = Some(Actor {
            user_id,
            username: username.to_string(),
        });
    }

    /// Forget the signed-in user
    pub fn clear(&mut self) {
        self.actor = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.actor.is_some()
    }

    /// The signed-in user's id, or the `-1` sentinel when nobody is
    pub fn current_user_id(&self) -> i64 {
        self.actor.as_ref().map(|a| a.user_id).unwrap_or(NO_USER)
    }

    pub fn current_username(&self) -> Option<&str> {
        self.actor.as_ref().map(|a| a.username.as_str())
    }

    /// The acting identity, or an error when nobody is signed in.
    /// Scoped operations call this first so the tenancy id is explicit.
    pub fn actor(&self) -> Result<&Actor> {
        self.actor.as_ref().ok_or(Error::SessionRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_reports_sentinel() {
        let session = Session::new();

        assert!(!session.is_signed_in());
        assert_eq!(session.current_user_id(), NO_USER);
        assert!(session.current_username().is_none());
    }

    #[test]
    fn test_sign_in_and_clear() {
        let mut session = Session::new();

        session.sign_in(42, "alice");
        assert!(session.is_signed_in());
        assert_eq!(session.current_user_id(), 42);
        assert_eq!(session.current_username(), Some("alice"));

        session.clear();
        assert!(!session.is_signed_in());
        assert_eq!(session.current_user_id(), NO_USER);
        assert!(session.current_username().is_none());
    }

    #[test]
    fn test_actor_requires_sign_in() {
        let mut session = Session::new();

        let err = session.actor().expect_err("no actor while signed out");
        assert!(matches!(err, Error::SessionRequired));

        session.sign_in(7, "bob");
        let actor = session.actor().expect("actor after sign-in");
        assert_eq!(actor.user_id, 7);
        assert_eq!(actor.username, "bob");
    }

    #[test]
    fn test_sign_in_replaces_previous_identity() {
        let mut session = Session::new();

        session.sign_in(1, "alice");
        session.sign_in(2, "bob");

        assert_eq!(session.current_user_id(), 2);
        assert_eq!(session.current_username(), Some("bob"));
    }
}
