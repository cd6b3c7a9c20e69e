//! Credential model and secret wrappers.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
