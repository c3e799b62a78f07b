//! Core Components
//!
//! HTTP transport, CSRF state and configuration sources.

pub mod config_source;
pub mod state;
pub mod transport;

pub use config_source::*;
pub use state::*;
pub use transport::*;
