//! Session Store
//!
//! Per-user session storage the login flow reads from and writes to.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{SessionError, SocialLoginError};

/// Session store interface.
///
/// One store handle belongs to one end-user session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Result<Option<Value>, SocialLoginError>;

    /// Write a value, replacing any previous one.
    async fn put(&self, key: &str, value: Value) -> Result<(), SocialLoginError>;

    /// Check whether a value exists.
    async fn has(&self, key: &str) -> Result<bool, SocialLoginError>;

    /// Remove a value. Returns whether one was present.
    async fn forget(&self, key: &str) -> Result<bool, SocialLoginError>;
}

/// In-memory session store implementation.
#[derive(Default)]
pub struct InMemorySessionStore {
    values: Mutex<HashMap<String, Value>>,
}

impl InMemorySessionStore {
    /// Create new in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SocialLoginError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), SocialLoginError> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, SocialLoginError> {
        Ok(self.values.lock().unwrap().contains_key(key))
    }

    async fn forget(&self, key: &str) -> Result<bool, SocialLoginError> {
        Ok(self.values.lock().unwrap().remove(key).is_some())
    }
}

/// Mock session store for testing.
#[derive(Default)]
pub struct MockSessionStore {
    values: Mutex<HashMap<String, Value>>,
    put_history: Mutex<Vec<(String, Value)>>,
    get_history: Mutex<Vec<String>>,
    forget_history: Mutex<Vec<String>>,
    should_fail: Mutex<bool>,
}

impl MockSessionStore {
    /// Create new mock session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    pub fn add_value(&self, key: &str, value: Value) -> &Self {
        self.values.lock().unwrap().insert(key.to_string(), value);
        self
    }

    /// Set store to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Current value under a key, bypassing history.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Keys currently held, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get put history.
    pub fn get_put_history(&self) -> Vec<(String, Value)> {
        self.put_history.lock().unwrap().clone()
    }

    /// Get read history.
    pub fn get_get_history(&self) -> Vec<String> {
        self.get_history.lock().unwrap().clone()
    }

    /// Get forget history.
    pub fn get_forget_history(&self) -> Vec<String> {
        self.forget_history.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), SocialLoginError> {
        if *self.should_fail.lock().unwrap() {
            return Err(SocialLoginError::Session(SessionError::ReadFailed {
                message: "Mock session store failure".to_string(),
            }));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), SocialLoginError> {
        if *self.should_fail.lock().unwrap() {
            return Err(SocialLoginError::Session(SessionError::WriteFailed {
                message: "Mock session store failure".to_string(),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, SocialLoginError> {
        self.check_read()?;
        self.get_history.lock().unwrap().push(key.to_string());
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), SocialLoginError> {
        self.check_write()?;
        self.put_history
            .lock()
            .unwrap()
            .push((key.to_string(), value.clone()));
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, SocialLoginError> {
        self.check_read()?;
        Ok(self.values.lock().unwrap().contains_key(key))
    }

    async fn forget(&self, key: &str) -> Result<bool, SocialLoginError> {
        self.check_write()?;
        self.forget_history.lock().unwrap().push(key.to_string());
        Ok(self.values.lock().unwrap().remove(key).is_some())
    }
}
