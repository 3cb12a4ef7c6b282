//! Credential model: redacted secrets, storage keys, and login pairs.

pub mod credential;

pub use credential::*;
