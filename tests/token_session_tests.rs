//! Integration tests for the token session over mock collaborators.

use serde_json::json;
use social_login::{
    social_login_config, ApiParameters, HttpMethod, MockApiTransport, MockLoginHelper,
    MockSessionStore, ProviderSession, RedirectCallback, ScopeList, SessionError, SocialLoginConfig,
    SocialLoginError, TokenSession,
};
use std::sync::Arc;

type MockSession = TokenSession<MockSessionStore, MockLoginHelper, MockApiTransport>;

fn test_config() -> SocialLoginConfig {
    social_login_config()
        .client_id("app-123")
        .client_secret("app-secret")
        .redirect_url("https://app.example.com/fb/callback")
        .add_default_scope("email")
        .build()
        .expect("valid config")
}

fn create_session() -> (
    MockSession,
    Arc<MockSessionStore>,
    Arc<MockLoginHelper>,
    Arc<MockApiTransport>,
) {
    let store = Arc::new(MockSessionStore::new());
    let helper = Arc::new(MockLoginHelper::new());
    let api = Arc::new(MockApiTransport::new());
    let session =
        TokenSession::with_components(test_config(), store.clone(), helper.clone(), api.clone());
    (session, store, helper, api)
}

fn callback() -> RedirectCallback {
    RedirectCallback::from_query("code=AQD123&state=abc")
}

#[tokio::test]
async fn test_empty_store_completes_redirect_and_caches_token() {
    let (session, _store, helper, _api) = create_session();
    helper.set_next_session(ProviderSession::from_token("tok123"));

    let token = session.resolve_access_token(&callback()).await.unwrap();

    assert_eq!(token.as_deref(), Some("tok123"));
    assert_eq!(helper.redirect_calls(), 1);
    assert_eq!(session.cached_token().await.unwrap().as_deref(), Some("tok123"));
    assert_eq!(
        session.cached_session().await.unwrap(),
        Some(ProviderSession::from_token("tok123"))
    );
}

#[tokio::test]
async fn test_cached_token_skips_redirect_exchange() {
    let (session, store, helper, _api) = create_session();
    store.add_value("facebook.access_token", json!("tokABC"));

    let token = session.resolve_access_token(&callback()).await.unwrap();

    assert_eq!(token.as_deref(), Some("tokABC"));
    assert_eq!(helper.redirect_calls(), 0);
}

#[tokio::test]
async fn test_failed_exchange_returns_none_and_stores_nothing() {
    let (session, store, _helper, _api) = create_session();

    assert_eq!(session.resolve_access_token(&callback()).await.unwrap(), None);
    assert!(!session.capture_callback(&callback()).await.unwrap());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_request_forwards_cached_session_and_path() {
    let (session, store, _helper, api) = create_session();
    let stored = ProviderSession::from_token("stored").with_token_type("bearer");
    store.add_value("facebook.session", serde_json::to_value(&stored).unwrap());
    let decoded = json!({"id": "10", "name": "Grace", "friends": {"data": []}});
    api.queue_response(decoded.clone());

    let value = session
        .request(HttpMethod::Get, "/me", None, None, None)
        .await
        .unwrap();

    assert_eq!(value, decoded);
    let sent = api.get_last_request().unwrap();
    assert_eq!(sent.session, stored);
    assert_eq!(sent.path, "/me");
}

#[tokio::test]
async fn test_request_wraps_parameter_token_in_ephemeral_session() {
    let (session, _store, _helper, api) = create_session();
    api.queue_response(json!({"id": "10"}));

    session
        .request(
            HttpMethod::Get,
            "/me",
            Some(ApiParameters::new().access_token("tokXYZ")),
            None,
            None,
        )
        .await
        .unwrap();

    let sent = api.get_last_request().unwrap();
    assert_eq!(sent.session.token(), "tokXYZ");
    assert!(sent.session.expires_at.is_none());
}

#[tokio::test]
async fn test_request_prefers_stored_session_over_parameter_token() {
    let (session, store, _helper, api) = create_session();
    store.add_value("facebook.session", json!({"access_token": "stored"}));
    api.queue_response(json!({}));

    session
        .post(
            "/me/feed",
            Some(ApiParameters::new().access_token("param").field("message", "hi")),
            None,
            None,
        )
        .await
        .unwrap();

    let sent = api.get_last_request().unwrap();
    assert_eq!(sent.session.token(), "stored");
    assert_eq!(sent.method, HttpMethod::Post);
}

#[tokio::test]
async fn test_full_login_lifecycle() {
    let (session, store, helper, api) = create_session();

    let redirect = session.authenticate(&ScopeList::new(), None).await.unwrap();
    assert!(redirect.location.contains("scope=email"));

    helper.set_next_session(ProviderSession::from_token("tokLIFE"));
    assert!(session.capture_callback(&callback()).await.unwrap());

    api.queue_response(json!({"id": "7"}));
    assert_eq!(session.profile().await.unwrap(), json!({"id": "7"}));

    session.logout().await.unwrap();
    assert!(store.keys().is_empty());
    assert!(matches!(
        session.profile().await,
        Err(SocialLoginError::Session(SessionError::NotAuthenticated))
    ));
}

#[tokio::test]
async fn test_cache_token_overwrites() {
    let (session, _store, _helper, _api) = create_session();

    session.cache_token("first").await.unwrap();
    session.cache_token("second").await.unwrap();

    assert_eq!(session.cached_token().await.unwrap().as_deref(), Some("second"));
}
