//! Wire protocol types for the translation service.
//!
//! Covers the HTTP request/response payloads, the JSON envelope every
//! endpoint answers with, the result stream messages, and the language
//! catalogue the service supports.

pub mod constants;
pub mod envelope;
pub mod languages;
pub mod messages;
pub mod stream;

// Re-export primary types for convenience.
pub use envelope::{Ack, ApiResponse, NoData};
pub use stream::{SentenceUpdate, StreamCommand, StreamMessage, StreamStatus};
