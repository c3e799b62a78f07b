//! Callback Types
//!
//! Query parameters carried by the request the provider redirected back to.

use url::Url;

/// Callback parameters from the login redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedirectCallback {
    /// Authorization code (if the user granted access).
    pub code: Option<String>,
    /// State parameter echoed by the provider.
    pub state: Option<String>,
    /// Error code (if authorization failed).
    pub error: Option<String>,
    /// Provider-specific reason, e.g. `user_denied`.
    pub error_reason: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

impl RedirectCallback {
    /// A request that carries no callback artifacts.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse callback parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Parse callback parameters from URL string.
    pub fn from_url_str(url_str: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url_str)?;
        Ok(Self::from_url(&url))
    }

    /// Parse callback parameters from a raw query string (without `?`).
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(
        pairs: impl Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    ) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_reason" => params.error_reason = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }

    /// Check if callback contains an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check if callback carries an authorization code and no error.
    pub fn is_success(&self) -> bool {
        self.code.as_deref().is_some_and(|c| !c.is_empty()) && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_from_url() {
        let url = Url::parse("https://app.example.com/fb/callback?code=abc123&state=xyz789").unwrap();
        let params = RedirectCallback::from_url(&url);

        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert_eq!(params.state.as_deref(), Some("xyz789"));
        assert!(params.is_success());
    }

    #[test]
    fn test_callback_user_denied() {
        let params = RedirectCallback::from_query(
            "error=access_denied&error_reason=user_denied&error_description=Permissions+error",
        );

        assert!(params.code.is_none());
        assert!(params.is_error());
        assert!(!params.is_success());
        assert_eq!(params.error_reason.as_deref(), Some("user_denied"));
        assert_eq!(params.error_description.as_deref(), Some("Permissions error"));
    }

    #[test]
    fn test_empty_callback_is_not_success() {
        assert!(!RedirectCallback::empty().is_success());
        assert!(!RedirectCallback::from_query("code=").is_success());
    }
}
