//! Upload routing: validation, then single-shot or chunked transfer.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxbridge_transfer::{UploadTask, format_size, validate_audio_file};

use crate::chunked::{ChunkedUploader, acknowledged, emit};
use crate::error::UploadError;
use crate::transport::UploadTransport;
use crate::types::{UploadEvent, UploadOptions, UploadReport};

/// Uploads an audio file into a running session.
///
/// Files at or below `chunked_threshold` go up in one request; larger
/// ones through [`ChunkedUploader`].
pub struct FileUploader<'a> {
    transport: &'a dyn UploadTransport,
    options: UploadOptions,
}

impl<'a> FileUploader<'a> {
    pub fn new(transport: &'a dyn UploadTransport, options: UploadOptions) -> Self {
        Self { transport, options }
    }

    /// Validates and uploads `path`. Any failure is also reported as
    /// [`UploadEvent::Failed`].
    pub async fn upload_file(
        &self,
        path: &Path,
        session_id: &str,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadReport, UploadError> {
        let result = self.run(path, session_id, events).await;
        if let Err(e) = &result {
            warn!(path = %path.display(), error = %e, "audio upload failed");
            emit(events, UploadEvent::Failed {
                message: e.to_string(),
            })
            .await;
        }
        result
    }

    /// Whether a file of `size` bytes takes the chunked path.
    pub fn is_chunked(&self, size: u64) -> bool {
        size > self.options.chunked_threshold
    }

    async fn run(
        &self,
        path: &Path,
        session_id: &str,
        events: &mpsc::Sender<UploadEvent>,
    ) -> Result<UploadReport, UploadError> {
        if session_id.trim().is_empty() {
            return Err(UploadError::Validation("no active session".into()));
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::Validation(format!("not a file: {}", path.display())))?;

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(UploadError::Validation(format!(
                "not a file: {}",
                path.display()
            )));
        }
        let size = metadata.len();
        validate_audio_file(&filename, size).map_err(|e| UploadError::Validation(e.to_string()))?;

        if self.is_chunked(size) {
            let mut task = UploadTask::new(path, session_id, size, self.options.chunk_size)?;
            let result = ChunkedUploader::new(self.transport).run(&mut task, events).await;
            debug!(
                status = ?task.status(),
                acked_chunks = task.current_index(),
                total_chunks = task.total_chunks(),
                "chunked upload finished"
            );
            return result;
        }

        info!(%filename, session_id, size = %format_size(size), "uploading audio file");
        emit(events, UploadEvent::Started {
            filename: filename.clone(),
            file_size: size,
            total_chunks: 0,
        })
        .await;

        let bytes = tokio::fs::read(path).await?;
        let ack = acknowledged(self.transport.send_whole(session_id, &filename, bytes).await)
            .map_err(|e| match e {
                voxbridge_client::ClientError::Rejected { message } => {
                    UploadError::UploadRejected { message }
                }
                other => UploadError::Transport(other),
            })?;

        emit(events, UploadEvent::Completed {
            filename: filename.clone(),
            message: ack.message.clone(),
        })
        .await;

        Ok(UploadReport {
            filename,
            file_size: size,
            total_chunks: 0,
            message: ack.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunked::tests::{Call, MockTransport, write_audio};

    fn options(chunk_size: u64, chunked_threshold: u64) -> UploadOptions {
        UploadOptions {
            chunk_size,
            chunked_threshold,
        }
    }

    #[tokio::test]
    async fn small_file_goes_single_shot() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "short.wav", 50);
        let transport = MockTransport::default();
        let (tx, mut rx) = mpsc::channel(16);

        let report = FileUploader::new(&transport, options(10, 100))
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap();

        assert_eq!(report.total_chunks, 0);
        assert_eq!(
            transport.calls(),
            vec![Call::Whole {
                session_id: "s-1".into(),
                filename: "short.wav".into(),
                len: 50,
            }]
        );
        assert!(matches!(rx.recv().await, Some(UploadEvent::Started { total_chunks: 0, .. })));
        assert!(matches!(rx.recv().await, Some(UploadEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn threshold_is_inclusive_for_single_shot() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "edge.mp3", 100);
        let transport = MockTransport::default();
        let (tx, _rx) = mpsc::channel(16);

        FileUploader::new(&transport, options(10, 100))
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap();
        assert!(matches!(transport.calls()[0], Call::Whole { .. }));
    }

    #[tokio::test]
    async fn large_file_goes_chunked() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "long.wav", 101);
        let transport = MockTransport::default();
        let (tx, _rx) = mpsc::channel(64);

        let report = FileUploader::new(&transport, options(10, 100))
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap();

        assert_eq!(report.total_chunks, 11);
        assert_eq!(transport.chunk_calls().len(), 11);
        assert_eq!(transport.completions().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_extension_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "notes.txt", 10);
        let transport = MockTransport::default();
        let (tx, mut rx) = mpsc::channel(16);

        let err = FileUploader::new(&transport, UploadOptions::default())
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(transport.calls().is_empty());
        assert!(matches!(rx.recv().await, Some(UploadEvent::Failed { .. })));
    }

    #[tokio::test]
    async fn empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "silence.wav", 0);
        let transport = MockTransport::default();
        let (tx, _rx) = mpsc::channel(16);

        let err = FileUploader::new(&transport, UploadOptions::default())
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_session_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "a.wav", 10);
        let transport = MockTransport::default();
        let (tx, _rx) = mpsc::channel(16);

        let err = FileUploader::new(&transport, UploadOptions::default())
            .upload_file(&path, "", &tx)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn single_shot_rejection_surfaces_message() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "a.aac", 10);
        let transport = MockTransport {
            reject_whole: Some("session not running".into()),
            ..Default::default()
        };
        let (tx, _rx) = mpsc::channel(16);

        let err = FileUploader::new(&transport, UploadOptions::default())
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("session not running"));
    }

    #[tokio::test]
    async fn chunk_failure_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = write_audio(&dir, "long.pcm", 30);
        let transport = MockTransport {
            reject_chunk: Some((1, "disk full".into())),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::channel(64);

        let err = FileUploader::new(&transport, options(10, 10))
            .upload_file(&path, "s-1", &tx)
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("disk full"));
        drop(tx);

        let mut failures = 0;
        while let Some(ev) = rx.recv().await {
            if matches!(ev, UploadEvent::Failed { .. }) {
                failures += 1;
            }
        }
        assert_eq!(failures, 1);
        assert!(transport.completions().is_empty());
    }
}
