//! Upload options, events and results.

use voxbridge_protocol::constants::DEFAULT_CHUNK_SIZE;

/// Tuning for [`FileUploader`](crate::FileUploader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Bytes per chunk.
    pub chunk_size: u64,
    /// Files larger than this go through the chunked path.
    pub chunked_threshold: u64,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunked_threshold: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Progress of an upload, sent on the caller's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        filename: String,
        file_size: u64,
        /// Zero for a single-shot upload.
        total_chunks: u64,
    },
    /// Chunk `index` (0-based) was acknowledged; `percent` counts it.
    ChunkAcked {
        index: u64,
        total: u64,
        percent: f64,
    },
    /// Every chunk is in; the completion request is on its way.
    Assembling { total_chunks: u64 },
    Completed {
        filename: String,
        message: Option<String>,
    },
    Failed { message: String },
}

/// Summary of a finished upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub filename: String,
    pub file_size: u64,
    /// Zero for a single-shot upload.
    pub total_chunks: u64,
    /// Server acknowledgment text, if any.
    pub message: Option<String>,
}
