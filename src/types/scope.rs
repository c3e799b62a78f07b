//! Scope Types

use serde::{Deserialize, Serialize};

/// Ordered list of permission scopes.
///
/// An empty list means "use the configured default scope".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeList(Vec<String>);

impl ScopeList {
    /// Create an empty scope list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scope, ignoring blanks and duplicates.
    pub fn push(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        let scope = scope.trim();
        if !scope.is_empty() && !self.0.iter().any(|s| s == scope) {
            self.0.push(scope.to_string());
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, scope: impl Into<String>) -> Self {
        self.push(scope);
        self
    }

    /// Parse a comma or whitespace separated scope string.
    pub fn parse(raw: &str) -> Self {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .fold(Self::new(), |scopes, s| scopes.with(s))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// This list, or `fallback` when this list is empty.
    pub fn or<'a>(&'a self, fallback: &'a ScopeList) -> &'a ScopeList {
        if self.is_empty() {
            fallback
        } else {
            self
        }
    }

    /// Join with the given separator.
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |scopes, s| scopes.with(s))
    }
}

impl From<Vec<String>> for ScopeList {
    fn from(scopes: Vec<String>) -> Self {
        scopes.into_iter().collect()
    }
}

impl From<&[&str]> for ScopeList {
    fn from(scopes: &[&str]) -> Self {
        scopes.iter().copied().collect()
    }
}
