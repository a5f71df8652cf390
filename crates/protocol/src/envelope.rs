use serde::{Deserialize, Serialize};

/// Fallback text when a failed response carries no explanation.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Envelope every HTTP endpoint answers with.
///
/// `success` is always present. Failures explain themselves in `message`
/// (most endpoints) or `error` (whole-file translation). Endpoint-specific
/// fields are flattened into `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

/// Payload of endpoints that only acknowledge (`{success, message?}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoData {}

/// A bare acknowledgment.
pub type Ack = ApiResponse<NoData>;

impl<T> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            data,
        }
    }

    /// Creates a failed response with a message.
    pub fn failed(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: None,
            data,
        }
    }

    /// The server's explanation for a failure: `message`, then `error`,
    /// then a generic fallback.
    pub fn failure_message(&self) -> String {
        non_empty(&self.message)
            .or_else(|| non_empty(&self.error))
            .unwrap_or(UNKNOWN_ERROR)
            .to_string()
    }

    /// Converts into `Ok(data)` on success, `Err(failure_message)` otherwise.
    pub fn into_result(self) -> Result<T, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.failure_message())
        }
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}

impl Ack {
    /// Creates a successful bare acknowledgment.
    pub fn success() -> Self {
        Self::ok(NoData {})
    }

    /// Creates a failed bare acknowledgment.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::failed(message, NoData {})
    }
}
