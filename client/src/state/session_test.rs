use std::sync::Arc;

use super::*;
use crate::net::api::ApiConfig;
use crate::net::transport::{HttpRequest, HttpResponse, Method, TransportError};
use crate::state::storage::MemoryTokenStorage;
use crate::test_support::{ScriptedTransport, json, no_content};

type Store = SessionStore<ScriptedTransport, MemoryTokenStorage>;

fn store<F>(storage: MemoryTokenStorage, handler: F) -> Store
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
{
    let api = Arc::new(ApiClient::new(ScriptedTransport::new(handler), ApiConfig::default()));
    SessionStore::new(api, storage)
}

fn credentials() -> LoginRequest {
    LoginRequest { email: "ada@example.com".to_owned(), password: "secret".to_owned() }
}

const PROFILE: &str = r#"{"id":7,"name":"Ada","surname":"Lovelace","email":"ada@example.com","admin":false}"#;

#[test]
fn new_without_persisted_token_is_anonymous() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, "{}")));
    assert!(!store.is_authenticated());
    assert_eq!(store.phase(), SessionPhase::Anonymous);
    assert!(!store.needs_profile());
    assert_eq!(store.api().auth_token(), None);
}

#[test]
fn new_hydrates_persisted_token() {
    let store = store(MemoryTokenStorage::with_token("tok"), |_| Ok(json(200, "{}")));
    assert!(store.is_authenticated());
    assert_eq!(store.session().token(), Some("tok"));
    assert_eq!(store.phase(), SessionPhase::Authenticated);
    assert!(store.needs_profile());
    assert_eq!(store.api().auth_token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn login_persists_token_and_user() {
    let store = store(MemoryTokenStorage::default(), |_| {
        Ok(json(200, &format!(r#"{{"token":"abc","user":{PROFILE}}}"#)))
    });

    let outcome = store.login(&credentials()).await;

    assert_eq!(outcome, AuthOutcome::Success { message: None });
    assert_eq!(store.session().token(), Some("abc"));
    assert_eq!(store.user().map(|u| u.display_name()).as_deref(), Some("Ada Lovelace"));
    assert_eq!(store.storage.load().as_deref(), Some("abc"));
    assert_eq!(store.api().auth_token().as_deref(), Some("abc"));
    assert!(!store.needs_profile());
}

#[tokio::test]
async fn login_reads_token_from_envelope() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, r#"{"data":{"token":"abc"}}"#)));
    assert!(store.login(&credentials()).await.is_success());
    assert_eq!(store.session().token(), Some("abc"));
    assert!(store.needs_profile());
}

#[tokio::test]
async fn login_without_token_fails_and_leaves_storage_alone() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, r#"{"user":null}"#)));

    let outcome = store.login(&credentials()).await;

    assert_eq!(outcome.error(), Some(TOKEN_MISSING_MESSAGE));
    assert!(!store.is_authenticated());
    assert_eq!(store.storage.load(), None);
    assert_eq!(store.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn login_with_blank_token_fails() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, r#"{"token":"  "}"#)));
    assert_eq!(store.login(&credentials()).await.error(), Some(TOKEN_MISSING_MESSAGE));
}

#[tokio::test]
async fn login_reports_server_message() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(401, r#"{"message":"Invalid credentials"}"#)));
    let outcome = store.login(&credentials()).await;
    assert_eq!(outcome.error(), Some("Invalid credentials"));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn login_reports_connection_failure() {
    let store = store(MemoryTokenStorage::default(), |_| Err(TransportError::Connection("refused".to_owned())));
    let outcome = store.login(&credentials()).await;
    assert!(outcome.error().is_some_and(|e| e.starts_with("Unable to reach the server")));
}

#[tokio::test]
async fn phase_is_authenticating_while_login_is_in_flight() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, r#"{"token":"abc"}"#)));
    let credentials = credentials();

    let login = store.login(&credentials);
    futures::pin_mut!(login);
    assert!(futures::poll!(login.as_mut()).is_pending());
    assert_eq!(store.phase(), SessionPhase::Authenticating);

    assert!(login.await.is_success());
    assert_eq!(store.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn dropped_login_does_not_stay_authenticating() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, r#"{"token":"abc"}"#)));
    let credentials = credentials();
    {
        let login = store.login(&credentials);
        futures::pin_mut!(login);
        assert!(futures::poll!(login.as_mut()).is_pending());
    }
    assert_eq!(store.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn register_succeeds_without_touching_session() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(201, r#"{"id":1}"#)));
    let user = RegisterRequest {
        name: "Ada".to_owned(),
        surname: "Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        password: "secret".to_owned(),
    };

    let outcome = store.register(&user).await;

    assert_eq!(outcome.message(), Some(REGISTERED_MESSAGE));
    assert!(!store.is_authenticated());
    assert_eq!(store.transport_count(Method::Post, "/auth/register"), 1);
}

#[tokio::test]
async fn register_failure_carries_message() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(400, r#"{"error":"Email already used"}"#)));
    let user = RegisterRequest {
        name: "Ada".to_owned(),
        surname: "Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        password: "secret".to_owned(),
    };
    assert_eq!(store.register(&user).await.error(), Some("Email already used"));
}

#[tokio::test]
async fn logout_clears_everything() {
    let store = store(MemoryTokenStorage::with_token("tok"), |_| Ok(no_content()));
    store.logout().await;

    assert!(!store.is_authenticated());
    assert_eq!(store.user(), None);
    assert_eq!(store.storage.load(), None);
    assert_eq!(store.api().auth_token(), None);
    assert_eq!(store.api().csrf_token(), None);
    assert_eq!(store.transport_count(Method::Post, "/auth/logout"), 1);
}

#[tokio::test]
async fn logout_clears_even_when_server_is_unreachable() {
    let store = store(MemoryTokenStorage::with_token("tok"), |_| Err(TransportError::Connection("down".to_owned())));
    store.logout().await;
    assert!(!store.is_authenticated());
    assert_eq!(store.storage.load(), None);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let store = store(MemoryTokenStorage::with_token("tok"), |_| Ok(no_content()));
    store.logout().await;
    store.logout().await;
    assert!(!store.is_authenticated());
    assert_eq!(store.transport_count(Method::Post, "/auth/logout"), 1);
}

#[tokio::test]
async fn fetch_user_info_without_token_sends_nothing() {
    let store = store(MemoryTokenStorage::default(), |_| Ok(json(200, PROFILE)));
    store.fetch_user_info().await;
    assert!(store.api().transport().requests().is_empty());
}

#[tokio::test]
async fn fetch_user_info_loads_profile() {
    let store = store(MemoryTokenStorage::with_token("tok"), |_| Ok(json(200, PROFILE)));
    store.fetch_user_info().await;

    assert_eq!(store.user().map(|u| u.email).as_deref(), Some("ada@example.com"));
    assert!(!store.needs_profile());
    let requests = store.api().transport().requests();
    assert_eq!(requests[0].header("authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn fetch_user_info_failure_logs_out() {
    let store = store(MemoryTokenStorage::with_token("stale"), |req| {
        if req.url.ends_with("/users/me") {
            Ok(json(401, r#"{"message":"Token expired"}"#))
        } else {
            Ok(no_content())
        }
    });

    store.fetch_user_info().await;

    assert!(!store.is_authenticated());
    assert_eq!(store.storage.load(), None);
    assert_eq!(store.transport_count(Method::Post, "/auth/logout"), 1);
}

impl Store {
    fn transport_count(&self, method: Method, path: &str) -> usize {
        self.api().transport().count(method, path)
    }
}
