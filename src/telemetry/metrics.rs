//! Metrics
//!
//! Counters for the token session's cache and API paths.

use std::collections::HashMap;
use std::sync::Mutex;

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// Metric names.
pub struct SessionMetricNames;

impl SessionMetricNames {
    pub const CACHE_HIT: &'static str = "social_login_token_cache_hit_total";
    pub const CACHE_MISS: &'static str = "social_login_token_cache_miss_total";
    pub const REDIRECT_EXCHANGE: &'static str = "social_login_redirect_exchange_total";
    pub const API_CALL: &'static str = "social_login_api_call_total";
    pub const LOGOUT: &'static str = "social_login_logout_total";
}

/// Token session metrics interface.
pub trait SessionMetrics: Send + Sync {
    /// Record a token served from the session.
    fn record_cache_hit(&self, provider: &str);

    /// Record a lookup that fell through to the redirect exchange.
    fn record_cache_miss(&self, provider: &str);

    /// Record the outcome of a redirect exchange.
    fn record_redirect_exchange(&self, provider: &str, success: bool);

    /// Record an API call.
    fn record_api_call(&self, provider: &str, method: &str, success: bool);

    /// Record a logout.
    fn record_logout(&self, provider: &str);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl SessionMetrics for NoOpMetrics {
    fn record_cache_hit(&self, _provider: &str) {}
    fn record_cache_miss(&self, _provider: &str) {}
    fn record_redirect_exchange(&self, _provider: &str, _success: bool) {}
    fn record_api_call(&self, _provider: &str, _method: &str, _success: bool) {}
    fn record_logout(&self, _provider: &str) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
    pub timestamp: u64,
}

/// In-memory metrics for testing.
#[derive(Default)]
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Number of entries recorded under a name.
    pub fn count(&self, name: &str) -> usize {
        self.get_entries_by_name(name).len()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    fn record(&self, name: &str, labels: MetricLabels) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        self.entries.lock().unwrap().push(MetricEntry {
            name: name.to_string(),
            value: 1.0,
            labels,
            timestamp: now,
        });
    }
}

fn labels(pairs: &[(&str, &str)]) -> MetricLabels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

impl SessionMetrics for InMemoryMetrics {
    fn record_cache_hit(&self, provider: &str) {
        self.record(SessionMetricNames::CACHE_HIT, labels(&[("provider", provider)]));
    }

    fn record_cache_miss(&self, provider: &str) {
        self.record(SessionMetricNames::CACHE_MISS, labels(&[("provider", provider)]));
    }

    fn record_redirect_exchange(&self, provider: &str, success: bool) {
        self.record(
            SessionMetricNames::REDIRECT_EXCHANGE,
            labels(&[("provider", provider), ("outcome", outcome(success))]),
        );
    }

    fn record_api_call(&self, provider: &str, method: &str, success: bool) {
        self.record(
            SessionMetricNames::API_CALL,
            labels(&[
                ("provider", provider),
                ("method", method),
                ("outcome", outcome(success)),
            ]),
        );
    }

    fn record_logout(&self, provider: &str) {
        self.record(SessionMetricNames::LOGOUT, labels(&[("provider", provider)]));
    }
}

/// Create in-memory metrics for testing.
pub fn create_in_memory_metrics() -> InMemoryMetrics {
    InMemoryMetrics::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_metrics() {
        let metrics = InMemoryMetrics::new();
        metrics.record_cache_hit("facebook");
        metrics.record_redirect_exchange("facebook", false);
        metrics.record_api_call("facebook", "GET", true);

        assert_eq!(metrics.get_entries().len(), 3);
        assert_eq!(metrics.count(SessionMetricNames::CACHE_HIT), 1);

        let exchange = metrics.get_entries_by_name(SessionMetricNames::REDIRECT_EXCHANGE);
        assert_eq!(exchange[0].labels["outcome"], "failure");

        metrics.clear();
        assert!(metrics.get_entries().is_empty());
    }
}
