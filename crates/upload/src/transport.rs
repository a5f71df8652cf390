//! Upload transport trait.
//!
//! `UploadTransport` is implemented for `ApiClient`; tests plug in mocks
//! that record every call.

use std::future::Future;
use std::pin::Pin;

use voxbridge_client::{ApiClient, ClientError};
use voxbridge_protocol::Ack;
use voxbridge_protocol::messages::{ChunkMeta, CompleteUploadRequest};

/// Future returned by every transport call.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Ack, ClientError>> + Send + 'a>>;

/// The three requests an upload needs.
pub trait UploadTransport: Send + Sync {
    /// Sends one chunk with its metadata.
    fn send_chunk<'a>(&'a self, meta: &'a ChunkMeta, bytes: Vec<u8>) -> TransportFuture<'a>;

    /// Asks the server to assemble the chunks it received.
    fn send_completion<'a>(&'a self, req: &'a CompleteUploadRequest) -> TransportFuture<'a>;

    /// Sends a whole file in one request.
    fn send_whole<'a>(
        &'a self,
        session_id: &'a str,
        filename: &'a str,
        bytes: Vec<u8>,
    ) -> TransportFuture<'a>;
}

impl UploadTransport for ApiClient {
    fn send_chunk<'a>(&'a self, meta: &'a ChunkMeta, bytes: Vec<u8>) -> TransportFuture<'a> {
        Box::pin(self.upload_chunk(meta, bytes))
    }

    fn send_completion<'a>(&'a self, req: &'a CompleteUploadRequest) -> TransportFuture<'a> {
        Box::pin(self.complete_upload(req))
    }

    fn send_whole<'a>(
        &'a self,
        session_id: &'a str,
        filename: &'a str,
        bytes: Vec<u8>,
    ) -> TransportFuture<'a> {
        Box::pin(self.upload_audio(session_id, filename, bytes))
    }
}
