//! Builders
//!
//! Fluent builders for configuration.

pub mod config;

pub use config::{social_login_config, SocialLoginConfigBuilder};
