//! CSRF State
//!
//! Generation and comparison of the `state` parameter sent with the login redirect.

use constant_time_eq::constant_time_eq;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// State generator interface (for dependency injection).
pub trait StateGenerator: Send + Sync {
    /// Produce a fresh, unguessable state value.
    fn generate(&self) -> String;
}

/// Random url-safe state, 32 bytes of entropy.
#[derive(Default)]
pub struct RandomStateGenerator;

impl RandomStateGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl StateGenerator for RandomStateGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 32] = rng.gen();
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
    }
}

/// Mock state generator returning queued values, then numbered fallbacks.
#[derive(Default)]
pub struct MockStateGenerator {
    queued: Mutex<VecDeque<String>>,
    generated: Mutex<u32>,
}

impl MockStateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next state to hand out.
    pub fn queue_state(&self, state: impl Into<String>) -> &Self {
        self.queued.lock().unwrap().push_back(state.into());
        self
    }

    /// Number of states generated so far.
    pub fn generated_count(&self) -> u32 {
        *self.generated.lock().unwrap()
    }
}

impl StateGenerator for MockStateGenerator {
    fn generate(&self) -> String {
        let mut generated = self.generated.lock().unwrap();
        *generated += 1;
        self.queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("mock-state-{}", *generated))
    }
}

/// Compare a stored state with the one echoed back in constant time.
pub fn states_match(expected: &str, received: &str) -> bool {
    constant_time_eq(expected.as_bytes(), received.as_bytes())
}
