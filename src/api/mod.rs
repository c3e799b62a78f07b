//! Graph API
//!
//! Transport used by [`TokenSession::request`](crate::TokenSession::request).

pub mod graph;

pub use graph::{decode_response_body, ApiTransport, GraphApiClient, MockApiTransport};
