/// Errors from the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("response missing {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Network failures, non-success HTTP statuses and response bodies
    /// that are not an envelope (a proxy error page, a truncated reply).
    ///
    /// Only these are worth retrying; a `success:false` answer is final.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Json(_))
    }

    /// Message the server gave when it refused the request.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}
