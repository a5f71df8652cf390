use voxbridge_client::ClientError;
use voxbridge_stream::StreamError;
use voxbridge_upload::UploadError;

use crate::state::{SessionAction, SessionPhase};

/// Errors surfaced by the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        action: SessionAction,
    },

    #[error("no active session")]
    NoSession,

    #[error("nothing to export")]
    NothingToExport,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Returns `true` if the request was refused before reaching the server.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) | Self::InvalidTransition { .. } | Self::NoSession => true,
            Self::Client(e) => matches!(e, ClientError::Validation(_)),
            Self::Upload(e) => e.is_validation(),
            _ => false,
        }
    }
}
