//! Authentication guard for protected views.

use super::{AuthError, Session};

/// Where the guard is in its mount-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The stored token has not been looked at yet.
    Checking,
    /// A token is present; protected content may render.
    Authorized,
    /// No token; the user is sent to the login screen and content never renders.
    Redirecting,
}

/// Gate in front of every protected view.
///
/// Only the presence of a token is checked. An expired or revoked token is
/// discovered by the first API call that fails with it.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    state: GuardState,
}

impl AuthGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Checking,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Performs the mount-time check. Once decided, the state does not change.
    pub fn check(&mut self, session: Option<&Session>) -> GuardState {
        if self.state == GuardState::Checking {
            self.state = match session {
                Some(session) if !session.token.is_empty() => GuardState::Authorized,
                _ => GuardState::Redirecting,
            };
        }
        self.state
    }

    /// Runs the check and hands back the session when access is granted.
    pub fn admit(session: Option<&Session>) -> Result<&Session, AuthError> {
        let mut guard = Self::new();
        match (guard.check(session), session) {
            (GuardState::Authorized, Some(session)) => Ok(session),
            _ => Err(AuthError::NotLoggedIn),
        }
    }
}

impl Default for AuthGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            user: User::default(),
        }
    }

    #[test]
    fn starts_in_checking() {
        assert_eq!(AuthGuard::new().state(), GuardState::Checking);
    }

    #[test]
    fn missing_token_redirects() {
        let mut guard = AuthGuard::new();
        assert_eq!(guard.check(None), GuardState::Redirecting);
        assert!(matches!(AuthGuard::admit(None), Err(AuthError::NotLoggedIn)));
    }

    #[test]
    fn empty_token_redirects() {
        let mut guard = AuthGuard::new();
        assert_eq!(guard.check(Some(&session(""))), GuardState::Redirecting);
    }

    #[test]
    fn present_token_authorizes() {
        let s = session("abc");
        let mut guard = AuthGuard::new();
        assert_eq!(guard.check(Some(&s)), GuardState::Authorized);
        assert_eq!(AuthGuard::admit(Some(&s)).unwrap().token, "abc");
    }

    #[test]
    fn decision_is_terminal() {
        let s = session("abc");
        let mut guard = AuthGuard::new();
        guard.check(None);
        assert_eq!(guard.check(Some(&s)), GuardState::Redirecting);
    }

    #[test]
    fn role_changes_need_super_admin() {
        let mut s = session("abc");
        assert!(matches!(
            s.require_super_admin(),
            Err(AuthError::NotSuperAdmin)
        ));
        s.user.is_super_admin = true;
        assert!(s.require_super_admin().is_ok());
    }
}
