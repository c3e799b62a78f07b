//! Social Login Error Types
//!
//! Error hierarchy for configuration, session store, transport and provider failures.
//!
//! A failed redirect exchange has no variant here. It surfaces as a `None`
//! token.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the social login integration.
#[derive(Error, Debug)]
pub enum SocialLoginError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl SocialLoginError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "SOCIAL_CONFIG",
            Self::Session(_) => "SOCIAL_SESSION",
            Self::Network(_) => "SOCIAL_NETWORK",
            Self::Protocol(_) => "SOCIAL_PROTOCOL",
            Self::Provider(_) => "SOCIAL_PROVIDER",
        }
    }

    /// Check if error requires the user to go through the login redirect again.
    pub fn needs_reauth(&self) -> bool {
        match self {
            Self::Session(SessionError::NotAuthenticated) => true,
            Self::Provider(ProviderError::OAuthException { .. }) => true,
            Self::Provider(ProviderError::Unauthorized { .. }) => true,
            _ => false,
        }
    }

    /// Get retry-after duration if the provider asked for one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Provider(ProviderError::RateLimited { retry_after }) => *retry_after,
            _ => None,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing credentials: {field}")]
    MissingCredentials { field: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },
}

/// Session store error.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session read failed: {message}")]
    ReadFailed { message: String },

    #[error("Session write failed: {message}")]
    WriteFailed { message: String },

    #[error("Corrupted session value under {key}: {message}")]
    CorruptedValue { key: String, message: String },

    #[error("No provider session or access token available for this request")]
    NotAuthenticated,
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("HTTP client initialisation failed: {message}")]
    ClientInit { message: String },
}

/// Protocol/response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}

/// Provider (Graph API) error.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("OAuth exception ({code}): {message}")]
    OAuthException {
        code: i64,
        subcode: Option<i64>,
        message: String,
        trace_id: Option<String>,
    },

    #[error("Graph API error ({error_type}, {code}): {message}")]
    Graph {
        error_type: String,
        code: i64,
        subcode: Option<i64>,
        message: String,
        trace_id: Option<String>,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Request rejected: {message}")]
    BadRequest { message: String },
}

/// Result type for social login operations.
pub type SocialLoginResult<T> = Result<T, SocialLoginError>;

/// Error envelope returned by the Graph API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphErrorBody,
}

/// Body of a Graph API error.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct GraphErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

/// Graph error codes that signal throttling.
const THROTTLING_CODES: [i64; 4] = [4, 17, 32, 613];

/// Map a Graph error body to a provider error.
pub fn map_graph_error(body: &GraphErrorBody) -> ProviderError {
    if THROTTLING_CODES.contains(&body.code) {
        return ProviderError::RateLimited { retry_after: None };
    }

    if body.error_type == "OAuthException" {
        return ProviderError::OAuthException {
            code: body.code,
            subcode: body.error_subcode,
            message: body.message.clone(),
            trace_id: body.fbtrace_id.clone(),
        };
    }

    ProviderError::Graph {
        error_type: body.error_type.clone(),
        code: body.code,
        subcode: body.error_subcode,
        message: body.message.clone(),
        trace_id: body.fbtrace_id.clone(),
    }
}

/// Parse a Graph error envelope from an HTTP body.
pub fn parse_error_response(body: &str) -> Option<GraphErrorBody> {
    serde_json::from_str::<GraphErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

/// Create error from a non-success HTTP response.
pub fn create_error_from_response(status: u16, body: &str) -> SocialLoginError {
    if let Some(graph) = parse_error_response(body) {
        return SocialLoginError::Provider(map_graph_error(&graph));
    }

    let error = match status {
        401 | 403 => ProviderError::Unauthorized {
            message: format!("HTTP {}", status),
        },
        429 => ProviderError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        },
        400..=499 => ProviderError::BadRequest {
            message: format!("HTTP {}", status),
        },
        _ => ProviderError::ServerError {
            message: format!("HTTP {}", status),
        },
    };

    SocialLoginError::Provider(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_error() {
        let body = r#"{"error":{"message":"Error validating access token","type":"OAuthException","code":190,"error_subcode":463,"fbtrace_id":"AbC"}}"#;
        let parsed = parse_error_response(body).unwrap();
        assert_eq!(parsed.code, 190);
        assert_eq!(parsed.error_subcode, Some(463));
        assert_eq!(parsed.error_type, "OAuthException");
    }

    #[test]
    fn test_oauth_exception_needs_reauth() {
        let body = r#"{"error":{"message":"expired","type":"OAuthException","code":190}}"#;
        let error = create_error_from_response(400, body);
        assert!(error.needs_reauth());
        assert_eq!(error.error_code(), "SOCIAL_PROVIDER");
    }

    #[test]
    fn test_throttling_code_maps_to_rate_limited() {
        let body = r#"{"error":{"message":"Application request limit reached","type":"OAuthException","code":4}}"#;
        let error = create_error_from_response(400, body);
        assert!(matches!(
            error,
            SocialLoginError::Provider(ProviderError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_status_fallback_without_graph_body() {
        let error = create_error_from_response(429, "slow down");
        assert_eq!(error.retry_after(), Some(Duration::from_secs(60)));

        let error = create_error_from_response(502, "<html>");
        assert!(matches!(
            error,
            SocialLoginError::Provider(ProviderError::ServerError { .. })
        ));
        assert!(!error.needs_reauth());
    }

    #[test]
    fn test_not_authenticated_needs_reauth() {
        assert!(SocialLoginError::Session(SessionError::NotAuthenticated).needs_reauth());
        assert!(!SocialLoginError::Network(NetworkError::ConnectionFailed {
            message: "refused".to_string()
        })
        .needs_reauth());
    }
}
