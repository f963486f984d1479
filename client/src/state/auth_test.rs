use super::*;
use crate::state::session::SessionStore;
use crate::state::storage::MemoryTokenStorage;
use crate::net::api::{ApiClient, ApiConfig};
use crate::test_support::{ScriptedTransport, json};

fn snapshot(token: Option<&str>) -> Session {
    let storage = token.map_or_else(MemoryTokenStorage::default, MemoryTokenStorage::with_token);
    let api = ApiClient::new(ScriptedTransport::new(|_| Ok(json(200, "{}"))), ApiConfig::default());
    SessionStore::new(std::sync::Arc::new(api), storage).session()
}

#[test]
fn default_state_is_anonymous() {
    let state = AuthState::default();
    assert!(!state.is_authenticated());
    assert!(!state.loading);
    assert_eq!(state.display_name(), "");
}

#[test]
fn token_without_profile_is_authenticated() {
    let state = AuthState::new(snapshot(Some("tok")), true);
    assert!(state.is_authenticated());
    assert_eq!(state.user(), None);
    assert_eq!(state.display_name(), "Signed in");
}
