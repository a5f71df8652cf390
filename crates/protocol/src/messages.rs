use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Stores the API key server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveApiKeyRequest {
    pub api_key: String,
}

/// Starts a translation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartTranslationRequest {
    pub api_key: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    #[serde(default)]
    pub use_microphone: bool,
}

/// Identifies the session for pause, resume and stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// Completion handshake of a chunked upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteUploadRequest {
    pub session_id: String,
    pub filename: String,
    pub total_chunks: u64,
}

/// Metadata sent alongside the bytes of one chunk.
///
/// Travels as multipart text fields, not JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMeta {
    pub session_id: String,
    pub filename: String,
    pub chunk_index: u64,
    pub total_chunks: u64,
}

/// Parameters of a whole-file translation.
///
/// Travels as multipart text fields; targets are comma-joined on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTranslateRequest {
    pub api_key: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
}

impl SyncTranslateRequest {
    /// Target languages in their wire form (`"en,ja"`).
    pub fn joined_targets(&self) -> String {
        self.target_languages.join(",")
    }
}

// ---------------------------------------------------------------------------
// Response payloads (flattened into `ApiResponse`)
// ---------------------------------------------------------------------------

/// `GET /api/languages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguagesResponse {
    #[serde(default)]
    pub languages: BTreeMap<String, String>,
}

/// `POST /api/start_translation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartTranslationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket_url: Option<String>,
}

/// `POST /api/translate_file_sync`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncTranslateResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, Vec<String>>,
}

/// A started session as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub session_id: String,
    pub websocket_url: String,
}
