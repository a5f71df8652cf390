//! Sequential chunked uploader.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxbridge_client::ClientError;
use voxbridge_protocol::Ack;
use voxbridge_protocol::messages::{ChunkMeta, CompleteUploadRequest};
use voxbridge_transfer::{ChunkReader, UploadTask, format_size};

use crate::error::UploadError;
use crate::transport::UploadTransport;
use crate::types::{UploadEvent, UploadReport};

/// Pushes one file into a session chunk by chunk.
///
/// Exactly one request is in flight at a time. Chunks go out in ascending
/// order and the next one is read only after the previous one was
/// acknowledged. The first failure ends the upload: no retry, no further
/// chunks, no completion request.
pub struct ChunkedUploader<'a> {
    transport: &'a dyn UploadTransport,
}

impl<'a> ChunkedUploader<'a> {
    pub fn new(transport: &'a dyn UploadTransport) -> Self {
        Self { transport }
    }

    /// Uploads `task` and sends the completion request.
    ///
    /// Progress goes to `events`; a failure is reported there as well as
    /// returned. `task` is left in its final state: `Completed`, or
    /// `Failed` with its index at the first chunk that was not acknowledged.
    pub async fn upload(
        &self,
        task: &mut UploadTask,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadReport, UploadError> {
        let result = self.run(task, events).await;
        if let Err(e) = &result {
            emit(events, UploadEvent::Failed {
                message: e.to_string(),
            })
            .await;
        }
        result
    }

    /// Like [`upload`](Self::upload) without the `Failed` event.
    pub(crate) async fn run(
        &self,
        task: &mut UploadTask,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadReport, UploadError> {
        task.start();
        let result = self.transfer(task, events).await;
        match &result {
            Ok(_) => task.complete(),
            Err(e) => task.fail(e.to_string()),
        }
        result
    }

    async fn transfer(
        &self,
        task: &mut UploadTask,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadReport, UploadError> {
        let total = task.total_chunks();
        info!(
            filename = %task.filename(),
            session_id = %task.session_id(),
            size = %format_size(task.file_size()),
            total_chunks = total,
            "starting chunked upload"
        );

        let mut reader = open_reader(task).await?;
        emit(events, UploadEvent::Started {
            filename: task.filename().to_string(),
            file_size: task.file_size(),
            total_chunks: total,
        })
        .await;

        while !task.is_complete() {
            let index = task.current_index();
            let range = task.current_range()?;

            let (returned, bytes) = tokio::task::spawn_blocking(move || {
                let bytes = reader.read_chunk(range);
                (reader, bytes)
            })
            .await
            .map_err(|e| UploadError::Io(std::io::Error::other(e)))?;
            reader = returned;
            let bytes = bytes?;

            let meta = ChunkMeta {
                session_id: task.session_id().to_string(),
                filename: task.filename().to_string(),
                chunk_index: index,
                total_chunks: total,
            };
            debug!(chunk_index = index, total_chunks = total, len = bytes.len(), "sending chunk");

            let outcome = self.transport.send_chunk(&meta, bytes).await;
            if let Err(e) = acknowledged(outcome).map_err(|e| chunk_error(index, e)) {
                warn!(chunk_index = index, error = %e, "chunk upload failed");
                return Err(e);
            }

            task.advance()?;
            emit(events, UploadEvent::ChunkAcked {
                index,
                total,
                percent: task.progress_percent(),
            })
            .await;
        }

        emit(events, UploadEvent::Assembling {
            total_chunks: total,
        })
        .await;

        let req = CompleteUploadRequest {
            session_id: task.session_id().to_string(),
            filename: task.filename().to_string(),
            total_chunks: total,
        };
        let outcome = self.transport.send_completion(&req).await;
        let ack = match acknowledged(outcome) {
            Ok(ack) => ack,
            Err(e) => {
                let e = completion_error(e);
                warn!(error = %e, "upload completion failed");
                return Err(e);
            }
        };

        info!(filename = %task.filename(), total_chunks = total, "chunked upload complete");
        emit(events, UploadEvent::Completed {
            filename: task.filename().to_string(),
            message: ack.message.clone(),
        })
        .await;

        Ok(UploadReport {
            filename: task.filename().to_string(),
            file_size: task.file_size(),
            total_chunks: total,
            message: ack.message,
        })
    }
}

async fn open_reader(task: &UploadTask) -> Result<ChunkReader, UploadError> {
    let path = task.path().to_path_buf();
    let reader = tokio::task::spawn_blocking(move || ChunkReader::open(&path))
        .await
        .map_err(|e| UploadError::Io(std::io::Error::other(e)))??;
    Ok(reader)
}

/// Treats a `success:false` acknowledgment like a rejection.
pub(crate) fn acknowledged(outcome: Result<Ack, ClientError>) -> Result<Ack, ClientError> {
    let ack = outcome?;
    if ack.success {
        Ok(ack)
    } else {
        Err(ClientError::Rejected {
            message: ack.failure_message(),
        })
    }
}

fn chunk_error(index: u64, e: ClientError) -> UploadError {
    match e {
        ClientError::Rejected { message } => UploadError::ChunkRejected { index, message },
        other => UploadError::Transport(other),
    }
}

fn completion_error(e: ClientError) -> UploadError {
    match e {
        ClientError::Rejected { message } => UploadError::CompletionRejected { message },
        other => UploadError::Transport(other),
    }
}

pub(crate) async fn emit(events: &mpsc::Sender<UploadEvent>, event: UploadEvent) {
    let _ = events.send(event).await;
}
