//! Chunk planning, upload task state and file helpers for audio uploads.

mod chunked;
mod progress;
mod task;
mod validation;

pub use chunked::ChunkReader;
pub use progress::{SpeedCalculator, format_size};
pub use task::{ChunkPlan, UploadStatus, UploadTask};
pub use validation::validate_audio_file;

pub use voxbridge_protocol::constants::{DEFAULT_CHUNK_SIZE, MAX_UPLOAD_SIZE};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("chunk {index} out of range (total {total})")]
    ChunkOutOfRange { index: u64, total: u64 },

    #[error("upload task already complete")]
    TaskComplete,

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("unsupported audio format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("file is empty: {filename}")]
    EmptyFile { filename: String },

    #[error("file too large: {filename} is {size}, limit is {limit}")]
    FileTooLarge {
        filename: String,
        size: String,
        limit: String,
    },
}

impl TransferError {
    /// Returns `true` for errors caused by the input rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::EmptyFile { .. }
                | Self::FileTooLarge { .. }
                | Self::MissingFileName(_)
                | Self::InvalidChunkSize
        )
    }
}
