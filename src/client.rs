//! Token Session
//!
//! Resolves an access token for one user session: served from the session
//! store when cached, otherwise obtained by completing the login redirect
//! callback and written back to the store.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::api::{ApiTransport, GraphApiClient};
use crate::core::{HttpMethod, HttpTransport, ReqwestHttpTransport, DEFAULT_MAX_RESPONSE_SIZE};
use crate::error::{SessionError, SocialLoginError, SocialLoginResult};
use crate::flows::{LoginHelper, RedirectLoginHelper};
use crate::session::{SessionKeys, SessionStore};
use crate::telemetry::{NoOpMetrics, SessionMetrics};
use crate::types::{
    ApiParameters, ApiRequest, ProviderSession, RedirectCallback, RedirectInstruction,
    RedirectPolicy, ScopeList, SessionPhase, SessionToken, SocialLoginConfig,
};

/// Token session bound to one user session's store.
pub struct TokenSession<S: SessionStore, H: LoginHelper, A: ApiTransport> {
    config: SocialLoginConfig,
    keys: SessionKeys,
    store: Arc<S>,
    helper: Arc<H>,
    api: Arc<A>,
    metrics: Arc<dyn SessionMetrics>,
}

/// Token session wired to the redirect login helper and Graph API client.
pub type DefaultTokenSession<S, T = ReqwestHttpTransport> =
    TokenSession<S, RedirectLoginHelper<S, T>, GraphApiClient<T>>;

impl<S: SessionStore> DefaultTokenSession<S> {
    /// Create a token session with a fresh reqwest transport.
    ///
    /// Applications creating one session per request should build the
    /// transport once and use [`with_http_transport`](Self::with_http_transport).
    pub fn new(config: SocialLoginConfig, store: Arc<S>) -> SocialLoginResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::with_options(
            config.timeout,
            DEFAULT_MAX_RESPONSE_SIZE,
        )?);
        Ok(Self::with_http_transport(config, store, transport))
    }
}

impl<S: SessionStore, T: HttpTransport> DefaultTokenSession<S, T> {
    /// Create a token session over a shared HTTP transport.
    pub fn with_http_transport(config: SocialLoginConfig, store: Arc<S>, transport: Arc<T>) -> Self {
        let helper = Arc::new(RedirectLoginHelper::new(
            config.clone(),
            store.clone(),
            transport.clone(),
        ));
        let api = Arc::new(GraphApiClient::new(config.clone(), transport));
        Self::with_components(config, store, helper, api)
    }
}

impl<S: SessionStore, H: LoginHelper, A: ApiTransport> TokenSession<S, H, A> {
    /// Create a token session with custom collaborators.
    pub fn with_components(
        config: SocialLoginConfig,
        store: Arc<S>,
        helper: Arc<H>,
        api: Arc<A>,
    ) -> Self {
        let keys = SessionKeys::new(&config.provider.name);
        Self {
            config,
            keys,
            store,
            helper,
            api,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Replace the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn SessionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &SocialLoginConfig {
        &self.config
    }

    /// Get the session key layout.
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub fn client_id(&self) -> &str {
        &self.config.credentials.client_id
    }

    pub fn redirect_url(&self) -> &str {
        &self.config.credentials.redirect_url
    }

    fn provider(&self) -> &str {
        &self.config.provider.name
    }

    // ========== Login Redirect ==========

    /// Build the login dialog URL. An empty scope uses the configured default.
    pub async fn build_login_url(
        &self,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<String> {
        let scope = scope.or(&self.config.default_scopes);
        self.helper.login_url(scope, api_version).await
    }

    /// Redirect to the login dialog, whether or not a token is cached.
    pub async fn authenticate(
        &self,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<RedirectInstruction> {
        let url = self.build_login_url(scope, api_version).await?;
        Ok(RedirectInstruction::to(url))
    }

    /// Redirect to the login dialog according to `policy`.
    ///
    /// Returns `None` when the policy skips the redirect.
    pub async fn authenticate_with_policy(
        &self,
        policy: RedirectPolicy,
        scope: &ScopeList,
        api_version: Option<&str>,
    ) -> SocialLoginResult<Option<RedirectInstruction>> {
        if policy == RedirectPolicy::IfNoCachedToken && self.has_cached_token().await? {
            debug!(provider = self.provider(), "Token cached, skipping login redirect");
            return Ok(None);
        }
        self.authenticate(scope, api_version).await.map(Some)
    }

    /// Exchange the callback artifacts for a provider session and store it.
    ///
    /// Single use: a `None` result is not retried, the caller has to
    /// authenticate again.
    #[instrument(skip_all, fields(provider = %self.config.provider.name))]
    pub async fn complete_redirect(
        &self,
        callback: &RedirectCallback,
    ) -> SocialLoginResult<Option<SessionToken>> {
        let session = match self.helper.session_from_redirect(callback).await? {
            Some(session) if !session.token().is_empty() => session,
            _ => {
                self.metrics.record_redirect_exchange(self.provider(), false);
                debug!("Redirect callback yielded no session");
                return Ok(None);
            }
        };

        let value = serde_json::to_value(&session).map_err(|e| {
            SocialLoginError::Session(SessionError::WriteFailed {
                message: e.to_string(),
            })
        })?;
        self.store.put(self.keys.session(), value).await?;
        self.metrics.record_redirect_exchange(self.provider(), true);

        Ok(Some(SessionToken::from_session(session)))
    }

    // ========== Token Cache ==========

    /// Whether the session holds an access token.
    pub async fn has_cached_token(&self) -> SocialLoginResult<bool> {
        self.store.has(self.keys.access_token()).await
    }

    /// The cached access token, verbatim.
    pub async fn cached_token(&self) -> SocialLoginResult<Option<String>> {
        match self.store.get(self.keys.access_token()).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) => Ok(Some(token)),
            Some(other) => Err(SocialLoginError::Session(SessionError::CorruptedValue {
                key: self.keys.access_token().to_string(),
                message: format!("expected a string, found {}", other),
            })),
        }
    }

    /// Cache an access token, replacing any previous one.
    pub async fn cache_token(&self, token: &str) -> SocialLoginResult<()> {
        self.store
            .put(self.keys.access_token(), Value::String(token.to_string()))
            .await
    }

    /// The provider session stored by the last successful redirect.
    pub async fn cached_session(&self) -> SocialLoginResult<Option<ProviderSession>> {
        match self.store.get(self.keys.session()).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                SocialLoginError::Session(SessionError::CorruptedValue {
                    key: self.keys.session().to_string(),
                    message: e.to_string(),
                })
            }),
        }
    }

    /// Resolve a usable access token.
    ///
    /// A cached token is returned without touching the login helper. Otherwise
    /// the redirect callback is completed and its token cached.
    #[instrument(skip_all, fields(provider = %self.config.provider.name))]
    pub async fn resolve_access_token(
        &self,
        callback: &RedirectCallback,
    ) -> SocialLoginResult<Option<String>> {
        if self.has_cached_token().await? {
            self.metrics.record_cache_hit(self.provider());
            debug!("Access token served from session");
            return self.cached_token().await;
        }

        self.metrics.record_cache_miss(self.provider());
        match self.complete_redirect(callback).await? {
            Some(token) => {
                self.cache_token(&token.token).await?;
                info!("Access token obtained from login redirect");
                Ok(Some(token.token))
            }
            None => Ok(None),
        }
    }

    /// Whether a non-empty access token is available after handling the callback.
    pub async fn capture_callback(&self, callback: &RedirectCallback) -> SocialLoginResult<bool> {
        let token = self.resolve_access_token(callback).await?;
        Ok(token.is_some_and(|t| !t.is_empty()))
    }

    /// Forget the provider session, the access token and any pending login state.
    pub async fn logout(&self) -> SocialLoginResult<()> {
        self.store.forget(self.keys.session()).await?;
        self.store.forget(self.keys.access_token()).await?;
        self.store.forget(self.keys.state()).await?;
        self.metrics.record_logout(self.provider());
        info!(provider = self.provider(), "Logged out");
        Ok(())
    }

    /// Where this session stands in the login flow.
    pub async fn phase(&self) -> SocialLoginResult<SessionPhase> {
        if self.has_cached_token().await? {
            return Ok(SessionPhase::Cached);
        }
        if self.store.has(self.keys.state()).await? {
            return Ok(SessionPhase::RedirectPending);
        }
        Ok(SessionPhase::NoToken)
    }

    // ========== API Calls ==========

    /// Call the provider API.
    ///
    /// The stored provider session authorizes the call; without one, an
    /// `access_token` parameter or else the cached access token is wrapped in
    /// an ephemeral session. Transport errors propagate unchanged.
    #[instrument(skip(self, method, parameters), fields(provider = %self.config.provider.name, method = %method))]
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        let parameters = parameters.unwrap_or_default();
        let session = self.session_for_request(&parameters).await?;

        let request = ApiRequest {
            session,
            method,
            path: path.to_string(),
            parameters,
            api_version: api_version.map(str::to_string),
            etag: etag.map(str::to_string),
        };

        let result = self.api.call(request).await;
        self.metrics
            .record_api_call(self.provider(), method.as_str(), result.is_ok());
        result
    }

    async fn session_for_request(
        &self,
        parameters: &ApiParameters,
    ) -> SocialLoginResult<ProviderSession> {
        if let Some(session) = self.cached_session().await? {
            return Ok(session);
        }

        if let Some(token) = parameters.access_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(ProviderSession::from_token(token));
        }

        match self.cached_token().await? {
            Some(token) if !token.is_empty() => Ok(ProviderSession::from_token(token)),
            _ => Err(SocialLoginError::Session(SessionError::NotAuthenticated)),
        }
    }

    /// GET request.
    pub async fn get(
        &self,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        self.request(HttpMethod::Get, path, parameters, api_version, etag)
            .await
    }

    /// POST request.
    pub async fn post(
        &self,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        self.request(HttpMethod::Post, path, parameters, api_version, etag)
            .await
    }

    /// PUT request.
    pub async fn put(
        &self,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        self.request(HttpMethod::Put, path, parameters, api_version, etag)
            .await
    }

    /// PATCH request.
    pub async fn patch(
        &self,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        self.request(HttpMethod::Patch, path, parameters, api_version, etag)
            .await
    }

    /// DELETE request.
    pub async fn delete(
        &self,
        path: &str,
        parameters: Option<ApiParameters>,
        api_version: Option<&str>,
        etag: Option<&str>,
    ) -> SocialLoginResult<Value> {
        self.request(HttpMethod::Delete, path, parameters, api_version, etag)
            .await
    }

    /// Profile of the logged-in user.
    pub async fn profile(&self) -> SocialLoginResult<Value> {
        self.get("/me", None, None, None).await
    }
}
