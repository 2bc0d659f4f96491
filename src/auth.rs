//! Credentials, signed token issuance, and the token cache.

pub mod credential;
pub mod token;

pub use credential::*;
pub use token::{cache::*, *};
