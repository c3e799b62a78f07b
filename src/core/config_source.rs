//! Configuration Sources
//!
//! Where application credentials and defaults are read from when the caller
//! does not pass them explicitly.

use std::collections::HashMap;

/// Key for the application id.
pub const KEY_APP_ID: &str = "app_id";
/// Key for the application secret.
pub const KEY_APP_SECRET: &str = "app_secret";
/// Key for the redirect URL.
pub const KEY_REDIRECT_URL: &str = "redirect_url";
/// Key for the default scope (comma separated).
pub const KEY_SCOPE: &str = "scope";
/// Key for the default Graph version.
pub const KEY_GRAPH_VERSION: &str = "graph_version";

/// Configuration source interface.
pub trait ConfigSource: Send + Sync {
    /// Look up a configuration value.
    fn get(&self, key: &str) -> Option<String>;

    /// Look up a value, falling back to `default`.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Reads `<PREFIX>_<KEY>` environment variables, e.g. `FACEBOOK_APP_ID`.
pub struct EnvConfigSource {
    prefix: String,
}

impl EnvConfigSource {
    /// Source reading `FACEBOOK_*` variables.
    pub fn new() -> Self {
        Self::with_prefix("FACEBOOK")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key).to_uppercase()
    }
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key))
            .ok()
            .filter(|v| !v.is_empty())
    }
}

/// In-memory configuration source.
#[derive(Clone, Debug, Default)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        let source = EnvConfigSource::with_prefix("facebook");
        assert_eq!(source.var_name(KEY_APP_SECRET), "FACEBOOK_APP_SECRET");
    }

    #[test]
    fn test_env_source_reads_prefixed_variable() {
        std::env::set_var("SOCIALTEST_APP_ID", "from-env");
        let source = EnvConfigSource::with_prefix("SOCIALTEST");
        assert_eq!(source.get(KEY_APP_ID).as_deref(), Some("from-env"));
        assert!(source.get(KEY_APP_SECRET).is_none());
    }

    #[test]
    fn test_map_source_default() {
        let source = MapConfigSource::new().set(KEY_SCOPE, "email");
        assert_eq!(source.get_or(KEY_SCOPE, ""), "email");
        assert_eq!(source.get_or(KEY_REDIRECT_URL, "/"), "/");
    }
}
