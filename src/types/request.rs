//! API Request Types

use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::HttpMethod;
use crate::types::ProviderSession;

/// Parameters for a Graph API call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApiParameters {
    /// Access token to use when the user session holds no provider session.
    pub access_token: Option<String>,
    /// Remaining request fields, in key order.
    pub fields: BTreeMap<String, Value>,
}

impl ApiParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Add a request field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Fields flattened to string pairs for a query string or form body.
    ///
    /// Strings are sent as-is; every other value is sent as its JSON text.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// A fully resolved Graph API call handed to an [`ApiTransport`](crate::api::ApiTransport).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// Session whose token authorizes the call.
    pub session: ProviderSession,
    pub method: HttpMethod,
    /// Path relative to the versioned Graph root, e.g. `/me`.
    pub path: String,
    pub parameters: ApiParameters,
    /// Graph version; the configured default when `None`.
    pub api_version: Option<String>,
    /// Entity tag for a conditional request.
    pub etag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_pairs_stringifies_non_strings() {
        let params = ApiParameters::new()
            .field("fields", "id,name")
            .field("limit", 25)
            .field("published", json!(false));

        assert_eq!(
            params.to_pairs(),
            vec![
                ("fields".to_string(), "id,name".to_string()),
                ("limit".to_string(), "25".to_string()),
                ("published".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_access_token_kept_out_of_fields() {
        let params = ApiParameters::new().access_token("tokXYZ");
        assert_eq!(params.access_token.as_deref(), Some("tokXYZ"));
        assert!(params.to_pairs().is_empty());
    }
}
