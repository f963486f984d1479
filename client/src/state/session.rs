//! Session store: the auth token, the current user, and the flows that change them.
//!
//! ARCHITECTURE
//! ============
//! `SessionStore` is the only owner of [`Session`] and the only writer of the
//! persisted token. It pushes the token into the [`ApiClient`] on every change,
//! so the client never reads storage itself.
//!
//! ERROR HANDLING
//! ==============
//! `login`/`register` fold every failure into [`AuthOutcome::Failure`];
//! `logout` logs and carries on. A failed profile refresh means the server no
//! longer accepts the session, so it forces a local logout instead of
//! surfacing an error.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::api::ApiClient;
use crate::net::services::{auth, users};
use crate::net::transport::Transport;
use crate::net::types::{LoginRequest, RegisterRequest, UserProfile};

use super::storage::TokenStorage;

pub const TOKEN_MISSING_MESSAGE: &str = "token missing from login response";
pub const REGISTERED_MESSAGE: &str = "Account created. You can now sign in.";

/// Auth token plus the user it belongs to.
///
/// There is no authenticated flag to set: [`Session::is_authenticated`] is
/// derived from the token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Result of a login or registration attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { message: Option<String> },
    Failure { error: String },
}

impl AuthOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message } => message.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self::Failure { error: error.into() }
    }
}

#[derive(Debug, Default)]
struct Inner {
    session: Session,
    logins_in_flight: usize,
}

/// Marks a login as in flight for as long as it lives, including when the
/// login future is dropped half-way.
struct LoginInFlight<'a>(&'a Mutex<Inner>);

impl<'a> LoginInFlight<'a> {
    fn start(inner: &'a Mutex<Inner>) -> Self {
        lock(inner).logins_in_flight += 1;
        Self(inner)
    }
}

impl Drop for LoginInFlight<'_> {
    fn drop(&mut self) {
        let mut inner = lock(self.0);
        inner.logins_in_flight = inner.logins_in_flight.saturating_sub(1);
    }
}

/// Owner of the session and its persisted token.
pub struct SessionStore<T, S> {
    api: Arc<ApiClient<T>>,
    storage: S,
    inner: Mutex<Inner>,
}

impl<T: Transport, S: TokenStorage> SessionStore<T, S> {
    /// Hydrate from storage. A persisted token authenticates optimistically;
    /// the caller schedules [`SessionStore::fetch_user_info`] after first
    /// render to confirm it.
    pub fn new(api: Arc<ApiClient<T>>, storage: S) -> Self {
        let token = storage.load();
        if token.is_some() {
            log::debug!("restored persisted session token");
        }
        api.set_auth_token(token.clone());
        Self { api, storage, inner: Mutex::new(Inner { session: Session { token, user: None }, logins_in_flight: 0 }) }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient<T>> {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> Session {
        lock(&self.inner).session.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        lock(&self.inner).session.is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        lock(&self.inner).session.user.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let inner = lock(&self.inner);
        if inner.session.is_authenticated() {
            SessionPhase::Authenticated
        } else if inner.logins_in_flight > 0 {
            SessionPhase::Authenticating
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Authenticated but the profile has not been loaded yet.
    #[must_use]
    pub fn needs_profile(&self) -> bool {
        let inner = lock(&self.inner);
        inner.session.is_authenticated() && inner.session.user.is_none()
    }

    /// Log in with email and password.
    ///
    /// On success the token is persisted and the session is authenticated;
    /// the user is taken from the response when it carries one. Loading the
    /// full profile afterwards is the caller's job and cannot fail the login.
    pub async fn login(&self, credentials: &LoginRequest) -> AuthOutcome {
        let response = {
            let _in_flight = LoginInFlight::start(&self.inner);
            auth::login(&self.api, credentials).await
        };

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                log::warn!("login failed: {err}");
                return AuthOutcome::failure(err.message());
            }
        };
        let Some(token) = response.usable_token().map(str::to_owned) else {
            log::warn!("login response carried no token");
            return AuthOutcome::failure(TOKEN_MISSING_MESSAGE);
        };

        if let Err(err) = self.storage.save(&token) {
            log::warn!("could not persist session token: {err}");
        }
        self.api.set_auth_token(Some(token.clone()));
        {
            let mut inner = lock(&self.inner);
            inner.session.token = Some(token);
            inner.session.user = response.user;
        }
        AuthOutcome::Success { message: None }
    }

    /// Create an account. The session is left untouched.
    pub async fn register(&self, user: &RegisterRequest) -> AuthOutcome {
        match auth::register(&self.api, user).await {
            Ok(_) => AuthOutcome::Success { message: Some(REGISTERED_MESSAGE.to_owned()) },
            Err(err) => {
                log::warn!("registration failed: {err}");
                AuthOutcome::failure(err.message())
            }
        }
    }

    /// End the session. The server call is best-effort; local state is
    /// always cleared. Safe to call repeatedly.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            if let Err(err) = auth::logout(&self.api).await {
                log::warn!("logout request failed, clearing local session anyway: {err}");
            }
        }
        self.clear_local();
    }

    /// Load the current user's profile. Without a token this does nothing; if
    /// the server rejects the call the session is logged out.
    pub async fn fetch_user_info(&self) {
        let Some(token) = self.session().token else {
            return;
        };

        match users::me(&self.api).await {
            Ok(user) => {
                let mut inner = lock(&self.inner);
                if inner.session.token.as_deref() == Some(token.as_str()) {
                    inner.session.user = Some(user);
                } else {
                    log::debug!("discarding profile fetched for a replaced session");
                }
            }
            Err(err) => {
                if self.session().token.as_deref() != Some(token.as_str()) {
                    return;
                }
                log::warn!("profile refresh failed, signing out: {err}");
                self.logout().await;
            }
        }
    }

    fn clear_local(&self) {
        lock(&self.inner).session = Session::default();
        if let Err(err) = self.storage.clear() {
            log::warn!("could not clear persisted session token: {err}");
        }
        self.api.clear_session();
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
