//! End-to-end tests of the redirect login and Graph API paths over reqwest.

use serde_json::json;
use social_login::{
    social_login_config, ApiParameters, InMemorySessionStore, ProviderError, RedirectCallback,
    ReqwestHttpTransport, ScopeList, SessionPhase, SocialLoginError, TokenSession,
};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type HttpSession =
    social_login::DefaultTokenSession<InMemorySessionStore, ReqwestHttpTransport>;

async fn setup() -> (MockServer, HttpSession, Arc<InMemorySessionStore>) {
    let mock_server = MockServer::start().await;

    let config = social_login_config()
        .client_id("app-123")
        .client_secret("app-secret")
        .redirect_url("https://app.example.com/fb/callback")
        .dialog_base_url(mock_server.uri())
        .graph_base_url(mock_server.uri())
        .add_default_scope("email")
        .build()
        .expect("valid config");

    let store = Arc::new(InMemorySessionStore::new());
    let session = TokenSession::new(config, store.clone()).expect("transport builds");
    (mock_server, session, store)
}

async fn issued_state(session: &HttpSession) -> String {
    let redirect = session.authenticate(&ScopeList::new(), None).await.unwrap();
    let url = Url::parse(&redirect.location).unwrap();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    query["state"].clone()
}

#[tokio::test]
async fn test_login_url_points_at_dialog() {
    let (mock_server, session, _store) = setup().await;

    let redirect = session
        .authenticate(&ScopeList::parse("email,user_friends"), Some("v2.1"))
        .await
        .unwrap();

    let url = Url::parse(&redirect.location).unwrap();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert!(redirect.location.starts_with(&mock_server.uri()));
    assert_eq!(url.path(), "/v2.1/dialog/oauth");
    assert_eq!(query["client_id"], "app-123");
    assert_eq!(query["redirect_uri"], "https://app.example.com/fb/callback");
    assert_eq!(query["scope"], "email,user_friends");
    assert!(!query["state"].is_empty());
    assert_eq!(session.phase().await.unwrap(), SessionPhase::RedirectPending);
}

#[tokio::test]
async fn test_logout_after_forced_redirect_resets_phase() {
    let (_mock_server, session, store) = setup().await;
    session.cache_token("tok").await.unwrap();
    session.authenticate(&ScopeList::new(), None).await.unwrap();

    session.logout().await.unwrap();

    assert_eq!(session.phase().await.unwrap(), SessionPhase::NoToken);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_callback_exchange_then_profile() {
    let (mock_server, session, _store) = setup().await;
    let state = issued_state(&session).await;

    Mock::given(method("GET"))
        .and(path("/v2.0/oauth/access_token"))
        .and(query_param("code", "AQD123"))
        .and(query_param("client_id", "app-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("access_token=tokHTTP&expires=5183999"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.0/me"))
        .and(query_param("access_token", "tokHTTP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1001",
            "name": "Ada Lovelace"
        })))
        .mount(&mock_server)
        .await;

    let callback = RedirectCallback::from_query(&format!("code=AQD123&state={}", state));
    let token = session.resolve_access_token(&callback).await.unwrap();
    assert_eq!(token.as_deref(), Some("tokHTTP"));
    assert_eq!(session.phase().await.unwrap(), SessionPhase::Cached);

    let stored = session.cached_session().await.unwrap().unwrap();
    assert!(stored.expires_at.is_some());

    // Second resolution is served from the session; the exchange mock expects one call.
    assert_eq!(
        session.resolve_access_token(&callback).await.unwrap().as_deref(),
        Some("tokHTTP")
    );

    let profile = session.profile().await.unwrap();
    assert_eq!(profile["name"], "Ada Lovelace");
}

#[tokio::test]
async fn test_state_mismatch_skips_exchange() {
    let (mock_server, session, store) = setup().await;
    issued_state(&session).await;

    Mock::given(method("GET"))
        .and(path("/v2.0/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let callback = RedirectCallback::from_query("code=AQD123&state=forged");
    assert!(!session.capture_callback(&callback).await.unwrap());
    assert!(session.cached_token().await.unwrap().is_none());
    // Only the pending state remains.
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_rejected_exchange_yields_no_token() {
    let (mock_server, session, _store) = setup().await;
    let state = issued_state(&session).await;

    Mock::given(method("GET"))
        .and(path("/v2.0/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "This authorization code has been used.",
                "type": "OAuthException",
                "code": 100
            }
        })))
        .mount(&mock_server)
        .await;

    let callback = RedirectCallback::from_query(&format!("code=used&state={}", state));
    assert_eq!(session.resolve_access_token(&callback).await.unwrap(), None);
    assert_eq!(session.phase().await.unwrap(), SessionPhase::NoToken);
}

#[tokio::test]
async fn test_conditional_request_not_modified() {
    let (mock_server, session, _store) = setup().await;
    session.cache_token("tokETAG").await.unwrap();

    Mock::given(method("GET"))
        .and(path("/v2.1/me/picture"))
        .and(header("if-none-match", "\"etag-1\""))
        .respond_with(ResponseTemplate::new(304))
        .mount(&mock_server)
        .await;

    let value = session
        .get("/me/picture", None, Some("v2.1"), Some("\"etag-1\""))
        .await
        .unwrap();
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn test_graph_error_propagates_from_request() {
    let (mock_server, session, _store) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v2.0/12345"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Error validating access token",
                "type": "OAuthException",
                "code": 190,
                "fbtrace_id": "AbCdEf"
            }
        })))
        .mount(&mock_server)
        .await;

    let error = session
        .delete(
            "/12345",
            Some(ApiParameters::new().access_token("expired")),
            None,
            None,
        )
        .await
        .unwrap_err();

    assert!(error.needs_reauth());
    match error {
        SocialLoginError::Provider(ProviderError::OAuthException { code, trace_id, .. }) => {
            assert_eq!(code, 190);
            assert_eq!(trace_id.as_deref(), Some("AbCdEf"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
