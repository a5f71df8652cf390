//! HTTP API client for the translation service.
//!
//! Async client using `reqwest` covering session control, audio uploads
//! and whole-file translation. Every endpoint answers with the JSON
//! envelope from `voxbridge_protocol::envelope`.

pub mod client;
pub mod error;
pub mod retry;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ApiClient, ClientConfig, DEFAULT_SERVER_URL};
pub use error::ClientError;
pub use retry::RetryPolicy;
