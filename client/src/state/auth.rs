//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard and user-aware pages to coordinate login redirects
//! and identity-dependent rendering. The app mirrors the session store into a
//! signal of this type after every change, so views never lock the store.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserProfile;

use super::session::Session;

/// Snapshot of the session plus whether the startup profile load is pending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub session: Session,
    pub loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn new(session: Session, loading: bool) -> Self {
        Self { session, loading }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// Header label: the user's name, or a placeholder while it loads.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.user() {
            Some(user) => user.display_name(),
            None if self.is_authenticated() => "Signed in".to_owned(),
            None => String::new(),
        }
    }
}
