//! Graph API Transport
//!
//! Forwards API calls to the provider's Graph API and decodes the response.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};
use url::Url;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{
    create_error_from_response, ConfigurationError, NetworkError, ProtocolError,
    SocialLoginError, SocialLoginResult,
};
use crate::types::{ApiRequest, SocialLoginConfig};

type HmacSha256 = Hmac<Sha256>;

/// Query fields set from the session, never taken from request parameters.
const AUTH_FIELDS: [&str; 2] = ["access_token", "appsecret_proof"];

/// API transport interface.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Perform the call and return the decoded response body.
    async fn call(&self, request: ApiRequest) -> SocialLoginResult<Value>;
}

/// Graph API client over an HTTP transport.
pub struct GraphApiClient<T: HttpTransport> {
    config: SocialLoginConfig,
    transport: Arc<T>,
}

impl<T: HttpTransport> GraphApiClient<T> {
    /// Create new Graph API client.
    pub fn new(config: SocialLoginConfig, transport: Arc<T>) -> Self {
        Self { config, transport }
    }

    /// HMAC-SHA256 of the access token keyed by the app secret, hex encoded.
    pub fn appsecret_proof(&self, access_token: &str) -> SocialLoginResult<String> {
        use secrecy::ExposeSecret;

        let secret = self.config.credentials.client_secret.expose_secret();
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
            SocialLoginError::Configuration(ConfigurationError::InvalidConfig {
                message: e.to_string(),
            })
        })?;
        mac.update(access_token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn build_http_request(&self, request: &ApiRequest) -> SocialLoginResult<HttpRequest> {
        let version = request
            .api_version
            .as_deref()
            .unwrap_or(&self.config.default_api_version);
        let raw_url = self.config.provider.graph_url(version, &request.path);
        let mut url = Url::parse(&raw_url).map_err(|_| {
            SocialLoginError::Configuration(ConfigurationError::InvalidEndpoint { url: raw_url })
        })?;

        let token = request.session.token();
        let mut pairs: Vec<(String, String)> = request
            .parameters
            .to_pairs()
            .into_iter()
            .filter(|(key, _)| !AUTH_FIELDS.contains(&key.as_str()))
            .collect();
        pairs.push(("access_token".to_string(), token.to_string()));
        pairs.push(("appsecret_proof".to_string(), self.appsecret_proof(token)?));

        let mut http_request = HttpRequest::new(request.method, String::new());
        http_request.timeout = Some(self.config.timeout);
        http_request
            .headers
            .insert("accept".to_string(), "application/json".to_string());

        if request.method.has_body() {
            let body = serde_urlencoded::to_string(&pairs).map_err(|e| {
                SocialLoginError::Protocol(ProtocolError::InvalidResponse {
                    message: e.to_string(),
                })
            })?;
            http_request.headers.insert(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
            http_request.body = Some(body);
        } else {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        if let Some(etag) = &request.etag {
            http_request
                .headers
                .insert("if-none-match".to_string(), etag.clone());
        }

        http_request.url = url.into();
        Ok(http_request)
    }
}

/// Decode a Graph response body.
///
/// JSON first; bodies such as `access_token=..&expires=..` decode to an object of strings.
pub fn decode_response_body(body: &str) -> SocialLoginResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    match serde_urlencoded::from_str::<HashMap<String, String>>(body) {
        Ok(pairs) if !pairs.is_empty() && pairs.values().any(|v| !v.is_empty()) => Ok(Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )),
        _ => Err(SocialLoginError::Protocol(ProtocolError::InvalidResponse {
            message: "response body is neither JSON nor form-encoded".to_string(),
        })),
    }
}

#[async_trait]
impl<T: HttpTransport> ApiTransport for GraphApiClient<T> {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn call(&self, request: ApiRequest) -> SocialLoginResult<Value> {
        let http_request = self.build_http_request(&request)?;
        let response = self.transport.send(http_request).await?;

        if response.is_not_modified() {
            debug!("Graph entity not modified");
            return Ok(Value::Object(Map::new()));
        }

        if !response.is_success() {
            return Err(create_error_from_response(response.status, &response.body));
        }

        decode_response_body(&response.body)
    }
}

/// Mock API transport for testing.
#[derive(Default)]
pub struct MockApiTransport {
    request_history: Mutex<Vec<ApiRequest>>,
    responses: Mutex<Vec<SocialLoginResult<Value>>>,
}

impl MockApiTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a decoded response.
    pub fn queue_response(&self, value: Value) -> &Self {
        self.responses.lock().unwrap().insert(0, Ok(value));
        self
    }

    /// Queue an error.
    pub fn queue_error(&self, error: SocialLoginError) -> &Self {
        self.responses.lock().unwrap().insert(0, Err(error));
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<ApiRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<ApiRequest> {
        self.request_history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ApiTransport for MockApiTransport {
    async fn call(&self, request: ApiRequest) -> SocialLoginResult<Value> {
        self.request_history.lock().unwrap().push(request);

        self.responses.lock().unwrap().pop().unwrap_or_else(|| {
            Err(SocialLoginError::Network(NetworkError::ConnectionFailed {
                message: "No mock response available".to_string(),
            }))
        })
    }
}
