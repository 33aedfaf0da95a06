//! Secrets distribution
//!
//! Glue for publishing refreshed session material to GitHub environment
//! secrets. The cryptographic sealing itself is injected through
//! [`SecretSealer`].

pub mod client;

pub use client::{EnvironmentPublicKey, SecretSealer, SecretsClient};
