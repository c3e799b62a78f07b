//! Session Types
//!
//! Provider session objects and the tokens extracted from them.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ScopeList;

/// Provider-issued session, stored verbatim in the user's session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    /// Bearer access token.
    pub access_token: String,
    /// Token type reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry, when the provider reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes the provider reported as granted.
    #[serde(default, skip_serializing_if = "ScopeList::is_empty")]
    pub scopes: ScopeList,
}

impl ProviderSession {
    /// Wrap a bare access token in an ephemeral session.
    pub fn from_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_at: None,
            scopes: ScopeList::new(),
        }
    }

    /// Set expiry relative to now.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        if seconds > 0 {
            self.expires_at = Some(Utc::now() + ChronoDuration::seconds(seconds));
        }
        self
    }

    /// Set token type.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Set granted scopes.
    pub fn with_scopes(mut self, scopes: ScopeList) -> Self {
        self.scopes = scopes;
        self
    }

    /// The access token carried by this session.
    pub fn token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Access token resolved for the current user session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    /// Opaque bearer token.
    pub token: String,
    /// Provider session the token came from, when known.
    pub session: Option<ProviderSession>,
}

impl SessionToken {
    /// Token obtained from a provider session.
    pub fn from_session(session: ProviderSession) -> Self {
        Self {
            token: session.access_token.clone(),
            session: Some(session),
        }
    }

    /// Bare token with no provider session attached.
    pub fn bare(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            session: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_empty()
    }
}

/// Where a user session currently stands in the login flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing cached and no login redirect outstanding.
    NoToken,
    /// A login redirect was issued and its callback has not completed yet.
    RedirectPending,
    /// An access token is cached in the session.
    Cached,
}

/// Instruction to redirect the current response to the login dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectInstruction {
    /// Absolute URL to redirect to.
    pub location: String,
}

impl RedirectInstruction {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

/// Whether `authenticate` redirects when a token is already cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Always redirect, forcing the provider dialog again.
    #[default]
    Always,
    /// Redirect only when the session holds no access token.
    IfNoCachedToken,
}
