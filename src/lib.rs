//! Social Login Integration
//!
//! Session-backed access token acquisition for a social login provider
//! (Facebook Graph by default).
//!
//! # Features
//!
//! - Login dialog redirect with CSRF state
//! - Redirect callback code exchange
//! - Access token and provider session cached in the user's session
//! - Graph API calls with `appsecret_proof` and conditional requests
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use social_login::{
//!     social_login_config, InMemorySessionStore, RedirectCallback, ScopeList, TokenSession,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = social_login_config()
//!         .client_id("my-app-id")
//!         .client_secret("my-app-secret")
//!         .redirect_url("https://myapp.com/login/callback")
//!         .add_default_scope("email")
//!         .build()?;
//!
//!     let store = Arc::new(InMemorySessionStore::new());
//!     let session = TokenSession::new(config, store)?;
//!
//!     // First request: send the user to the login dialog.
//!     let redirect = session.authenticate(&ScopeList::new(), None).await?;
//!     println!("Redirect to: {}", redirect.location);
//!
//!     // Callback request: exchange the code and cache the token.
//!     let callback = RedirectCallback::from_url_str(
//!         "https://myapp.com/login/callback?code=abc&state=xyz",
//!     )?;
//!     if let Some(token) = session.resolve_access_token(&callback).await? {
//!         let profile = session.profile().await?;
//!         println!("{} logged in with {}", profile["name"], token.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, session and request types
//! - `error`: error hierarchy and Graph error mapping
//! - `core`: HTTP transport, CSRF state generation, configuration sources
//! - `session`: session store trait, implementations and key layout
//! - `flows`: redirect login helper
//! - `api`: Graph API transport
//! - `builders`: fluent configuration builder
//! - `telemetry`: session metrics
//! - `client`: the token session combining all of the above

pub mod api;
pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod session;
pub mod telemetry;
pub mod types;

// Re-export main client
pub use client::{DefaultTokenSession, TokenSession};

// Re-export builders
pub use builders::{social_login_config, SocialLoginConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, map_graph_error, parse_error_response, ConfigurationError,
    GraphErrorBody, GraphErrorEnvelope, NetworkError, ProtocolError, ProviderError, SessionError,
    SocialLoginError, SocialLoginResult,
};

// Re-export types
pub use types::{
    // Config
    Credentials, ProviderConfig, SocialLoginConfig,
    // Session
    ProviderSession, RedirectInstruction, RedirectPolicy, SessionPhase, SessionToken,
    // Request
    ApiParameters, ApiRequest, RedirectCallback, ScopeList,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // State
    MockStateGenerator, RandomStateGenerator, StateGenerator,
    // Config sources
    ConfigSource, EnvConfigSource, MapConfigSource,
};

// Re-export session storage
pub use session::{InMemorySessionStore, MockSessionStore, SessionKeys, SessionStore};

// Re-export flows
pub use flows::{LoginHelper, MockLoginHelper, RedirectLoginHelper};

// Re-export API transport
pub use api::{ApiTransport, GraphApiClient, MockApiTransport};

// Re-export telemetry
pub use telemetry::{
    create_in_memory_metrics, no_op_metrics, InMemoryMetrics, MetricEntry, MetricLabels,
    NoOpMetrics, SessionMetricNames, SessionMetrics,
};
