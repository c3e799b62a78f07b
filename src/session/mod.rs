//! Session Storage
//!
//! Session store implementations and the fixed key layout used inside them.

pub mod store;

pub use store::{InMemorySessionStore, MockSessionStore, SessionStore};

/// Session keys owned by one provider.
///
/// - `<provider>.session`: serialized provider session
/// - `<provider>.access_token`: bare access token string
/// - `<provider>.state`: CSRF state of a pending login redirect
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKeys {
    session: String,
    access_token: String,
    state: String,
}

impl SessionKeys {
    pub fn new(provider: &str) -> Self {
        Self {
            session: format!("{}.session", provider),
            access_token: format!("{}.access_token", provider),
            state: format!("{}.state", provider),
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn state(&self) -> &str {
        &self.state
    }
}
