//! Upload error types.

use voxbridge_client::ClientError;
use voxbridge_transfer::TransferError;

/// Errors produced while uploading audio.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("chunk {index} rejected: {message}")]
    ChunkRejected { index: u64, message: String },

    #[error("upload completion rejected: {message}")]
    CompletionRejected { message: String },

    #[error("upload rejected: {message}")]
    UploadRejected { message: String },

    #[error("transport error: {0}")]
    Transport(#[from] ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
}

impl UploadError {
    /// Returns `true` if nothing was sent because the input was refused.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Transport(e) => matches!(e, ClientError::Validation(_)),
            Self::Transfer(e) => e.is_validation(),
            _ => false,
        }
    }

    /// The server's own words, when it refused part of the upload.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ChunkRejected { message, .. }
            | Self::CompletionRejected { message }
            | Self::UploadRejected { message } => Some(message),
            _ => None,
        }
    }
}
