//! Configuration Types
//!
//! Application credentials and provider endpoint configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::ScopeList;

/// Default provider name, used as the session key prefix.
pub const DEFAULT_PROVIDER_NAME: &str = "facebook";

/// Default login dialog host.
pub const DEFAULT_DIALOG_BASE_URL: &str = "https://www.facebook.com";

/// Default Graph API host.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com";

/// Default Graph API version.
pub const DEFAULT_GRAPH_VERSION: &str = "v2.0";

/// Redirect URL used when none is configured.
pub const DEFAULT_REDIRECT_URL: &str = "/";

/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Application credentials registered with the provider.
#[derive(Clone)]
pub struct Credentials {
    /// Application (client) identifier.
    pub client_id: String,
    /// Application secret.
    pub client_secret: SecretString,
    /// Redirect URL registered for the login dialog.
    pub redirect_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

/// Provider endpoint configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, also the prefix of every session key.
    pub name: String,
    /// Host serving the login dialog.
    pub dialog_base_url: String,
    /// Host serving the Graph API and token exchange.
    pub graph_base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROVIDER_NAME.to_string(),
            dialog_base_url: DEFAULT_DIALOG_BASE_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Graph URL for a versioned path.
    pub fn graph_url(&self, version: &str, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.graph_base_url.trim_end_matches('/'),
            version,
            path.trim_start_matches('/')
        )
    }

    /// Login dialog URL for a version.
    pub fn dialog_url(&self, version: &str) -> String {
        format!(
            "{}/{}/dialog/oauth",
            self.dialog_base_url.trim_end_matches('/'),
            version
        )
    }
}

/// Social login configuration.
#[derive(Clone, Debug)]
pub struct SocialLoginConfig {
    /// Application credentials.
    pub credentials: Credentials,
    /// Provider endpoints.
    pub provider: ProviderConfig,
    /// Scopes requested when a call passes an empty scope list.
    pub default_scopes: ScopeList,
    /// Graph version used when a call does not name one.
    pub default_api_version: String,
    /// Issue and verify a CSRF state on the login redirect.
    pub enable_state: bool,
    /// HTTP timeout.
    pub timeout: Duration,
}
