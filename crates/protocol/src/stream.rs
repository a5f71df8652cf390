//! Messages exchanged over the result stream (WebSocket).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Session status pushed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Connected,
    Paused,
    Resumed,
    Stopped,
    Complete,
    Error,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Provisional text the recognizer may still revise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stash {
    pub text: String,
}

/// One revision of a sentence, for the transcription or a translation.
///
/// The server resends a sentence with the same `sentence_id` as it grows;
/// `is_sentence_end` marks the final revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceUpdate {
    pub sentence_id: u64,
    pub text: String,
    #[serde(default)]
    pub is_sentence_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stash: Option<Stash>,
}

/// A server-to-client stream message.
///
/// Either a status notification (`status` set) or a result carrying a
/// transcription and/or per-language translations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StreamStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<SentenceUpdate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, SentenceUpdate>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sentence_end: bool,
}

impl StreamMessage {
    /// Creates a status notification.
    pub fn status(status: StreamStatus, message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message,
            ..Default::default()
        }
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// A client-to-server command: `{"command": "pause"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum StreamCommand {
    Pause,
    Resume,
    Stop,
}
