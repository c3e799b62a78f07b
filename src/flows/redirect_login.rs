//! Redirect Login Flow
//!
//! Login dialog URL construction and the redirect-callback code exchange.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::core::{
    states_match, HttpMethod, HttpRequest, HttpTransport, RandomStateGenerator, StateGenerator,
};
use crate::error::{
    create_error_from_response, ConfigurationError, ProtocolError, SocialLoginError,
    SocialLoginResult,
};
use crate::session::{SessionKeys, SessionStore};
use crate::types::{ProviderSession, RedirectCallback, ScopeList, SocialLoginConfig};

/// Identifies this integration in the dialog URL.
const SDK_NAME: &str = "rust-social-login";

/// Login helper interface.
#[async_trait]
pub trait LoginHelper: Send + Sync {
    /// Build the login dialog URL.
    async fn login_url(
        &self,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<String>;

    /// Exchange the artifacts of a redirect callback for a provider session.
    ///
    /// `Ok(None)` covers every exchange failure: denied consent, missing code,
    /// state mismatch and provider errors.
    async fn session_from_redirect(
        &self,
        callback: &RedirectCallback,
    ) -> SocialLoginResult<Option<ProviderSession>>;
}

/// Token endpoint JSON response.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Redirect login helper talking to the provider's dialog and token endpoints.
pub struct RedirectLoginHelper<S: SessionStore, T: HttpTransport, G: StateGenerator = RandomStateGenerator>
{
    config: SocialLoginConfig,
    keys: SessionKeys,
    store: Arc<S>,
    transport: Arc<T>,
    state_generator: Arc<G>,
}

impl<S: SessionStore, T: HttpTransport> RedirectLoginHelper<S, T, RandomStateGenerator> {
    /// Create helper with a random state generator.
    pub fn new(config: SocialLoginConfig, store: Arc<S>, transport: Arc<T>) -> Self {
        Self::with_state_generator(config, store, transport, Arc::new(RandomStateGenerator::new()))
    }
}

impl<S: SessionStore, T: HttpTransport, G: StateGenerator> RedirectLoginHelper<S, T, G> {
    /// Create helper with a custom state generator.
    pub fn with_state_generator(
        config: SocialLoginConfig,
        store: Arc<S>,
        transport: Arc<T>,
        state_generator: Arc<G>,
    ) -> Self {
        let keys = SessionKeys::new(&config.provider.name);
        Self {
            config,
            keys,
            store,
            transport,
            state_generator,
        }
    }

    /// State of the pending login redirect, issuing one if none is pending.
    pub async fn pending_state(&self) -> SocialLoginResult<String> {
        if let Some(state) = self.stored_state().await? {
            return Ok(state);
        }

        let state = self.state_generator.generate();
        self.store
            .put(self.keys.state(), serde_json::Value::String(state.clone()))
            .await?;
        debug!(provider = %self.config.provider.name, "Issued login state");
        Ok(state)
    }

    async fn stored_state(&self) -> SocialLoginResult<Option<String>> {
        Ok(self
            .store
            .get(self.keys.state())
            .await?
            .and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Consume the pending state if it matches the echoed one.
    async fn verify_state(&self, received: Option<&str>) -> SocialLoginResult<bool> {
        let expected = self.stored_state().await?;
        match (expected, received) {
            (Some(expected), Some(received)) if states_match(&expected, received) => {
                self.store.forget(self.keys.state()).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn parse_url(raw: &str) -> SocialLoginResult<Url> {
        Url::parse(raw).map_err(|_| {
            SocialLoginError::Configuration(ConfigurationError::InvalidEndpoint {
                url: raw.to_string(),
            })
        })
    }

    /// Exchange an authorization code for a provider session.
    ///
    /// Always uses the configured default Graph version. A per-call
    /// version only selects the login dialog; the code it issues is
    /// redeemable at any version.
    #[instrument(skip(self, code), fields(provider = %self.config.provider.name))]
    pub async fn exchange_code(&self, code: &str) -> SocialLoginResult<ProviderSession> {
        use secrecy::ExposeSecret;

        let credentials = &self.config.credentials;
        let mut url = Self::parse_url(
            &self
                .config
                .provider
                .graph_url(&self.config.default_api_version, "oauth/access_token"),
        )?;
        url.query_pairs_mut()
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", &credentials.redirect_url)
            .append_pair("client_secret", credentials.client_secret.expose_secret())
            .append_pair("code", code);

        let mut request = HttpRequest::new(HttpMethod::Get, url.to_string());
        request.timeout = Some(self.config.timeout);
        request
            .headers
            .insert("accept".to_string(), "application/json".to_string());

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(create_error_from_response(response.status, &response.body));
        }

        let session = parse_token_response(&response.body)?;
        info!("Exchanged authorization code for access token");
        Ok(session)
    }
}

/// Decode a token endpoint body, JSON or form-encoded.
fn parse_token_response(body: &str) -> SocialLoginResult<ProviderSession> {
    if let Ok(parsed) = serde_json::from_str::<TokenExchangeResponse>(body) {
        let mut session = ProviderSession::from_token(parsed.access_token);
        session.token_type = parsed.token_type;
        session.scopes = parsed.scope.as_deref().map(ScopeList::parse).unwrap_or_default();
        return Ok(session.expires_in(parsed.expires_in.unwrap_or(0)));
    }

    let pairs: HashMap<String, String> = serde_urlencoded::from_str(body).map_err(|e| {
        SocialLoginError::Protocol(ProtocolError::InvalidResponse {
            message: e.to_string(),
        })
    })?;

    let token = pairs
        .get("access_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            SocialLoginError::Protocol(ProtocolError::MissingField {
                field: "access_token".to_string(),
            })
        })?;

    let expires = pairs
        .get("expires")
        .and_then(|e| e.parse::<i64>().ok())
        .unwrap_or(0);

    let scopes = pairs
        .get("scope")
        .map(|s| ScopeList::parse(s))
        .unwrap_or_default();

    Ok(ProviderSession::from_token(token.clone())
        .with_scopes(scopes)
        .expires_in(expires))
}

#[async_trait]
impl<S: SessionStore, T: HttpTransport, G: StateGenerator> LoginHelper
    for RedirectLoginHelper<S, T, G>
{
    async fn login_url(
        &self,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<String> {
        let version = api_version.unwrap_or(&self.config.default_api_version);
        let scope = scope.or(&self.config.default_scopes);

        let state = if self.config.enable_state {
            Some(self.pending_state().await?)
        } else {
            None
        };

        let mut url = Self::parse_url(&self.config.provider.dialog_url(version))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.credentials.client_id)
                .append_pair("redirect_uri", &self.config.credentials.redirect_url);
            if let Some(state) = &state {
                query.append_pair("state", state);
            }
            query.append_pair("sdk", SDK_NAME);
            if !scope.is_empty() {
                query.append_pair("scope", &scope.join(","));
            }
        }

        Ok(url.into())
    }

    async fn session_from_redirect(
        &self,
        callback: &RedirectCallback,
    ) -> SocialLoginResult<Option<ProviderSession>> {
        let provider = self.config.provider.name.as_str();

        if let Some(error) = &callback.error {
            warn!(
                provider,
                error = %error,
                reason = callback.error_reason.as_deref().unwrap_or(""),
                "Login redirect returned an error"
            );
            return Ok(None);
        }

        let code = match callback.code.as_deref().filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => {
                debug!(provider, "No authorization code on request");
                return Ok(None);
            }
        };

        if self.config.enable_state && !self.verify_state(callback.state.as_deref()).await? {
            warn!(provider, "Login state mismatch, refusing code exchange");
            return Ok(None);
        }

        match self.exchange_code(code).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(provider, error_code = e.error_code(), error = %e, "Code exchange failed");
                Ok(None)
            }
        }
    }
}

/// Mock login helper for testing.
#[derive(Default)]
pub struct MockLoginHelper {
    login_url_history: Mutex<Vec<(ScopeList, Option<String>)>>,
    redirect_history: Mutex<Vec<RedirectCallback>>,
    next_session: Mutex<Option<ProviderSession>>,
}

impl MockLoginHelper {
    /// Create new mock helper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session the next redirect exchange yields.
    pub fn set_next_session(&self, session: ProviderSession) -> &Self {
        *self.next_session.lock().unwrap() = Some(session);
        self
    }

    /// Get login URL history.
    pub fn get_login_url_history(&self) -> Vec<(ScopeList, Option<String>)> {
        self.login_url_history.lock().unwrap().clone()
    }

    /// Get redirect exchange history.
    pub fn get_redirect_history(&self) -> Vec<RedirectCallback> {
        self.redirect_history.lock().unwrap().clone()
    }

    /// Number of redirect exchanges attempted.
    pub fn redirect_calls(&self) -> usize {
        self.redirect_history.lock().unwrap().len()
    }
}

#[async_trait]
impl LoginHelper for MockLoginHelper {
    async fn login_url(
        &self,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<String> {
        self.login_url_history
            .lock()
            .unwrap()
            .push((scope.clone(), api_version.map(str::to_string)));

        Ok(format!(
            "https://mock.example.com/{}/dialog/oauth?scope={}",
            api_version.unwrap_or("v2.0"),
            scope.join(",")
        ))
    }

    async fn session_from_redirect(
        &self,
        callback: &RedirectCallback,
    ) -> SocialLoginResult<Option<ProviderSession>> {
        self.redirect_history.lock().unwrap().push(callback.clone());
        Ok(self.next_session.lock().unwrap().take())
    }
}
