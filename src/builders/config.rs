//! Configuration Builder
//!
//! Fluent builder for the social login configuration.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::core::{
    ConfigSource, EnvConfigSource, KEY_APP_ID, KEY_APP_SECRET, KEY_GRAPH_VERSION,
    KEY_REDIRECT_URL, KEY_SCOPE,
};
use crate::error::{ConfigurationError, SocialLoginError};
use crate::types::{
    Credentials, ProviderConfig, ScopeList, SocialLoginConfig, DEFAULT_GRAPH_VERSION,
    DEFAULT_REDIRECT_URL, DEFAULT_TIMEOUT,
};

/// Social login configuration builder.
///
/// Values set on the builder win over values read from a [`ConfigSource`].
#[derive(Default)]
pub struct SocialLoginConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    redirect_url: Option<String>,
    provider: ProviderConfig,
    default_scopes: Option<ScopeList>,
    default_api_version: Option<String>,
    enable_state: Option<bool>,
    timeout: Option<Duration>,
}

impl SocialLoginConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set application id.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set application secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set redirect URL.
    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Set provider name (session key prefix).
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider.name = name.into();
        self
    }

    /// Set login dialog host.
    pub fn dialog_base_url(mut self, url: impl Into<String>) -> Self {
        self.provider.dialog_base_url = url.into();
        self
    }

    /// Set Graph API host.
    pub fn graph_base_url(mut self, url: impl Into<String>) -> Self {
        self.provider.graph_base_url = url.into();
        self
    }

    /// Set default scopes.
    pub fn default_scopes(mut self, scopes: impl Into<ScopeList>) -> Self {
        self.default_scopes = Some(scopes.into());
        self
    }

    /// Add a default scope.
    pub fn add_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scopes.get_or_insert_with(ScopeList::new).push(scope);
        self
    }

    /// Set default Graph version.
    pub fn default_api_version(mut self, version: impl Into<String>) -> Self {
        self.default_api_version = Some(version.into());
        self
    }

    /// Enable or disable the CSRF state parameter.
    pub fn enable_state(mut self, enable: bool) -> Self {
        self.enable_state = Some(enable);
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill every unset value from a configuration source.
    pub fn with_source(mut self, source: &dyn ConfigSource) -> Self {
        if self.client_id.is_none() {
            self.client_id = source.get(KEY_APP_ID);
        }
        if self.client_secret.is_none() {
            self.client_secret = source.get(KEY_APP_SECRET).map(SecretString::new);
        }
        if self.redirect_url.is_none() {
            self.redirect_url = source.get(KEY_REDIRECT_URL);
        }
        if self.default_scopes.is_none() {
            self.default_scopes = source.get(KEY_SCOPE).map(|s| ScopeList::parse(&s));
        }
        if self.default_api_version.is_none() {
            self.default_api_version = source.get(KEY_GRAPH_VERSION);
        }
        self
    }

    /// Fill every unset value from `FACEBOOK_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_source(&EnvConfigSource::new())
    }

    /// Build the configuration.
    pub fn build(self) -> Result<SocialLoginConfig, SocialLoginError> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing("client_id"))?;

        let client_secret = self
            .client_secret
            .filter(|secret| !secret.expose_secret().is_empty())
            .ok_or_else(|| missing("client_secret"))?;

        if self.provider.name.is_empty() {
            return Err(SocialLoginError::Configuration(
                ConfigurationError::InvalidConfig {
                    message: "provider name cannot be empty".to_string(),
                },
            ));
        }

        for url in [&self.provider.dialog_base_url, &self.provider.graph_base_url] {
            if url::Url::parse(url).is_err() {
                return Err(SocialLoginError::Configuration(
                    ConfigurationError::InvalidEndpoint { url: url.clone() },
                ));
            }
        }

        Ok(SocialLoginConfig {
            credentials: Credentials {
                client_id,
                client_secret,
                redirect_url: self
                    .redirect_url
                    .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            },
            provider: self.provider,
            default_scopes: self.default_scopes.unwrap_or_default(),
            default_api_version: self
                .default_api_version
                .unwrap_or_else(|| DEFAULT_GRAPH_VERSION.to_string()),
            enable_state: self.enable_state.unwrap_or(true),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

impl SocialLoginConfig {
    /// Build configuration from `FACEBOOK_*` environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FACEBOOK_APP_ID` (required)
    /// - `FACEBOOK_APP_SECRET` (required)
    /// - `FACEBOOK_REDIRECT_URL` (optional, defaults to `/`)
    /// - `FACEBOOK_SCOPE` (optional, comma separated)
    /// - `FACEBOOK_GRAPH_VERSION` (optional)
    pub fn from_env() -> Result<Self, SocialLoginError> {
        SocialLoginConfigBuilder::new().with_env().build()
    }

    /// Build configuration entirely from a configuration source.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, SocialLoginError> {
        SocialLoginConfigBuilder::new().with_source(source).build()
    }
}

fn missing(field: &str) -> SocialLoginError {
    SocialLoginError::Configuration(ConfigurationError::MissingCredentials {
        field: field.to_string(),
    })
}

/// Create a new configuration builder.
pub fn social_login_config() -> SocialLoginConfigBuilder {
    SocialLoginConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MapConfigSource;

    #[test]
    fn test_builder_success() {
        let config = social_login_config()
            .client_id("123")
            .client_secret("secret")
            .redirect_url("https://app.example.com/fb/callback")
            .add_default_scope("email")
            .add_default_scope("public_profile")
            .build()
            .unwrap();

        assert_eq!(config.credentials.client_id, "123");
        assert_eq!(config.default_scopes.join(","), "email,public_profile");
        assert_eq!(config.default_api_version, DEFAULT_GRAPH_VERSION);
        assert_eq!(config.provider.name, "facebook");
        assert!(config.enable_state);
    }

    #[test]
    fn test_missing_secret_is_missing_credentials() {
        let result = social_login_config().client_id("123").build();
        match result {
            Err(SocialLoginError::Configuration(ConfigurationError::MissingCredentials {
                field,
            })) => assert_eq!(field, "client_secret"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_empty_secret_is_missing_credentials() {
        let result = social_login_config().client_id("123").client_secret("").build();
        assert!(matches!(
            result,
            Err(SocialLoginError::Configuration(ConfigurationError::MissingCredentials { ref field }))
                if field == "client_secret"
        ));
    }

    #[test]
    fn test_redirect_url_defaults_to_root() {
        let config = social_login_config()
            .client_id("123")
            .client_secret("secret")
            .build()
            .unwrap();
        assert_eq!(config.credentials.redirect_url, "/");
    }

    #[test]
    fn test_explicit_values_win_over_source() {
        let source = MapConfigSource::new()
            .set(KEY_APP_ID, "from-source")
            .set(KEY_APP_SECRET, "source-secret")
            .set(KEY_REDIRECT_URL, "https://source.example.com/cb")
            .set(KEY_SCOPE, "email,user_likes");

        let config = social_login_config()
            .client_id("explicit")
            .with_source(&source)
            .build()
            .unwrap();

        assert_eq!(config.credentials.client_id, "explicit");
        assert_eq!(config.credentials.client_secret.expose_secret(), "source-secret");
        assert_eq!(config.credentials.redirect_url, "https://source.example.com/cb");
        assert_eq!(config.default_scopes.join(","), "email,user_likes");
    }

    #[test]
    fn test_invalid_graph_host() {
        let result = social_login_config()
            .client_id("123")
            .client_secret("secret")
            .graph_base_url("not a url")
            .build();
        assert!(matches!(
            result,
            Err(SocialLoginError::Configuration(
                ConfigurationError::InvalidEndpoint { .. }
            ))
        ));
    }
}
