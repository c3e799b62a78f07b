//! Login Flows
//!
//! The redirect login helper and its mock.

pub mod redirect_login;

pub use redirect_login::{LoginHelper, MockLoginHelper, RedirectLoginHelper};
