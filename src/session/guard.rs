//! Route-guard predicates. Pure decisions over a session snapshot — the
//! embedding front end performs whatever navigation the outcome asks for,
//! keeping session logic free of it.

use super::state::Session;
use super::user::access_rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render the gated content.
    Allow,
    /// Recovery has not resolved yet; render nothing gated, redirect nowhere.
    Pending,
    /// Not signed in: send to the login page.
    RedirectToLogin,
    /// Signed in but lacking the role: send to the unauthorized page.
    RedirectToUnauthorized,
}

/// Gate for pages that require any signed-in user.
pub fn require_authentication(session: &Session) -> GuardOutcome {
    if session.loading {
        return GuardOutcome::Pending;
    }
    if session.is_authenticated {
        GuardOutcome::Allow
    } else {
        GuardOutcome::RedirectToLogin
    }
}

/// Gate for administrator-only pages.
pub fn require_administrator(session: &Session) -> GuardOutcome {
    if session.loading {
        return GuardOutcome::Pending;
    }
    if !session.is_authenticated {
        return GuardOutcome::RedirectToLogin;
    }
    if session.is_administrator {
        GuardOutcome::Allow
    } else {
        GuardOutcome::RedirectToUnauthorized
    }
}

/// Gate for pages needing at least `level` on the portal's access ladder.
pub fn require_access_level(session: &Session, level: &str) -> GuardOutcome {
    if session.loading {
        return GuardOutcome::Pending;
    }
    let Some(user) = &session.user else {
        return GuardOutcome::RedirectToLogin;
    };
    if access_rank(&user.access_level) >= access_rank(level) {
        GuardOutcome::Allow
    } else {
        GuardOutcome::RedirectToUnauthorized
    }
}
