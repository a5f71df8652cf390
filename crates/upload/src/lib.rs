//! Audio upload flow for translation sessions.
//!
//! Library crate with no transport of its own: the session layer hands in
//! an `UploadTransport` (implemented for `ApiClient`) and receives
//! `UploadEvent`s on a channel.
//!
//! # Pipeline
//!
//! 1. **Validate**: extension allow-list, size limits, active session
//! 2. **Route**: single-shot up to the chunking threshold, chunked above
//! 3. **Upload**: one chunk in flight, ascending order, stop on first failure
//! 4. **Complete**: one assembly request after every chunk was acknowledged

pub mod chunked;
pub mod error;
pub mod file;
pub mod transport;
pub mod types;

pub use chunked::ChunkedUploader;
pub use error::UploadError;
pub use file::FileUploader;
pub use transport::{TransportFuture, UploadTransport};
pub use types::{UploadEvent, UploadOptions, UploadReport};
