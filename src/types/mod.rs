//! Social Login Types
//!
//! Core type definitions for the session-backed login flow.

pub mod callback;
pub mod config;
pub mod request;
pub mod scope;
pub mod session;

pub use callback::*;
pub use config::*;
pub use request::*;
pub use scope::*;
pub use session::*;
