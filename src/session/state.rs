use serde::Serialize;

use super::user::User;

/// Session lifecycle. `Initializing → {Authenticated, Anonymous}` happens
/// exactly once, during recovery; after that only sign-in
/// (`Anonymous → Authenticated`) and sign-out or validation failure
/// (`Authenticated → Anonymous`) move the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Initializing,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    /// True until recovery has produced its one resolution.
    pub fn loading(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Session {
        let user = self.user().cloned();
        Session {
            is_authenticated: user.is_some(),
            is_administrator: user.as_ref().map(User::is_administrator).unwrap_or(false),
            loading: self.loading(),
            user,
        }
    }
}

/// Consumer-facing view of the current session. Pages read this; guards
/// decide on it. Consumers must not render role-gated content while
/// `loading` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_administrator: bool,
    pub loading: bool,
}

impl Session {
    /// The resolved signed-out state. Sign-out must bring the session back
    /// to exactly this.
    pub fn anonymous() -> Self {
        Session { user: None, is_authenticated: false, is_administrator: false, loading: false }
    }
}
