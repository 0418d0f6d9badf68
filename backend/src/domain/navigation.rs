//! View navigation as a pure state machine.
//!
//! `transition` maps (current view, event) to the next view with no side
//! effects, so every move the app can make is testable as plain data.
//! `Navigator` wraps it with the two stateful obligations: sign-in and
//! sign-out must change the session and the view together, and a revision
//! counter tells the presentation layer when to re-render.

use log::info;

use crate::domain::session::Session;

/// The screens the application can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Login,
    Signup,
    ForgotPassword,
    Dashboard,
    RecordTransaction,
    Reports,
    Budgets,
    Settings,
}

impl ActiveView {
    /// Whether this screen only makes sense with a signed-in user
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            ActiveView::Login | ActiveView::Signup | ActiveView::ForgotPassword
        )
    }
}

/// Menu entries available once signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Dashboard,
    RecordTransaction,
    Reports,
    Budgets,
    Settings,
}

impl MenuItem {
    pub fn view(&self) -> ActiveView {
        match self {
            MenuItem::Dashboard => ActiveView::Dashboard,
            MenuItem::RecordTransaction => ActiveView::RecordTransaction,
            MenuItem::Reports => ActiveView::Reports,
            MenuItem::Budgets => ActiveView::Budgets,
            MenuItem::Settings => ActiveView::Settings,
        }
    }
}

/// Everything that can move the navigation state machine
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// Jump to the signup screen from the login screen
    GoToSignup,
    /// Jump to the password-reset screen from the login screen
    GoToForgotPassword,
    /// Return from signup or password reset to the login screen
    BackToLogin,
    /// Authentication succeeded; signs the user in and opens the dashboard
    LoginSucceeded { user_id: i64, username: String },
    /// Sign out and return to the login screen
    Logout,
    /// A signed-in menu selection
    Menu(MenuItem),
    /// A mutation succeeded; the current view re-renders with fresh data
    DataChanged,
}

/// Pure transition function: `(view, event) -> view`.
/// Events that make no sense for the current view leave it unchanged.
pub fn transition(view: ActiveView, event: &NavEvent) -> ActiveView {
    match event {
        NavEvent::GoToSignup if view == ActiveView::Login => ActiveView::Signup,
        NavEvent::GoToForgotPassword if view == ActiveView::Login => ActiveView::ForgotPassword,
        NavEvent::BackToLogin
            if view == ActiveView::Signup || view == ActiveView::ForgotPassword =>
        {
            ActiveView::Login
        }
        NavEvent::LoginSucceeded { .. } if !view.requires_session() => ActiveView::Dashboard,
        NavEvent::Logout => ActiveView::Login,
        NavEvent::Menu(item) if view.requires_session() => item.view(),
        NavEvent::DataChanged => view,
        _ => view,
    }
}

/// Owns the current view and applies events against the session
#[derive(Debug)]
pub struct Navigator {
    view: ActiveView,
    revision: u64,
}

impl Navigator {
    /// Before anyone authenticates, the application shows the login screen
    pub fn new() -> Self {
        Self {
            view: ActiveView::Login,
            revision: 0,
        }
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    /// Bumps whenever the presentation layer should re-render: on every
    /// view change and on every data refresh of the same view
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply one event. Sign-in and sign-out update the session and the
    /// view in this single call; neither ever happens without the other.
    pub fn handle(&mut self, event: NavEvent, session: &mut Session) -> ActiveView {
        match &event {
            NavEvent::LoginSucceeded { user_id, username } => {
                session.sign_in(*user_id, username);
            }
            NavEvent::Logout => {
                session.clear();
            }
            _ => {}
        }

        let next = transition(self.view, &event);
        if next != self.view || matches!(event, NavEvent::DataChanged) {
            self.revision += 1;
        }
        if next != self.view {
            info!("View change: {:?} -> {:?}", self.view, next);
        }
        self.view = next;
        self.view
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
