//! Typed events decoded from the result stream.

use voxbridge_protocol::constants::WS_CLOSE_INVALID_SESSION;
use voxbridge_protocol::{SentenceUpdate, StreamMessage, StreamStatus};

/// Something the result stream told us.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Session status change pushed by the server.
    Status {
        status: StreamStatus,
        message: Option<String>,
    },
    /// A revision of a sentence in the source language.
    Transcription(SentenceUpdate),
    /// A revision of a sentence translated into `language`.
    Translation {
        language: String,
        update: SentenceUpdate,
    },
    /// A frame that could not be decoded.
    Malformed(String),
    /// The connection ended. `code` is the close code when the server sent one.
    Closed { code: Option<u16>, reason: String },
}

impl StreamEvent {
    /// The server closed the stream because it does not know the session.
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, Self::Closed { code: Some(code), .. } if *code == WS_CLOSE_INVALID_SESSION)
    }
}

/// Splits a stream message into events.
///
/// A status message yields only its status, even if it carries results.
pub fn events_from_message(msg: StreamMessage) -> Vec<StreamEvent> {
    if let Some(status) = msg.status {
        return vec![StreamEvent::Status {
            status,
            message: msg.message,
        }];
    }

    let mut events = Vec::with_capacity(1 + msg.translations.len());
    if let Some(update) = msg.transcription {
        events.push(StreamEvent::Transcription(update));
    }
    events.extend(
        msg.translations
            .into_iter()
            .map(|(language, update)| StreamEvent::Translation { language, update }),
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<StreamEvent> {
        events_from_message(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn status_only() {
        let events = parse(r#"{"status":"paused","message":"paused by user"}"#);
        assert_eq!(
            events,
            vec![StreamEvent::Status {
                status: StreamStatus::Paused,
                message: Some("paused by user".into()),
            }]
        );
    }

    #[test]
    fn status_suppresses_results() {
        let events = parse(
            r#"{"status":"complete","transcription":{"sentence_id":1,"text":"hi","is_sentence_end":true}}"#,
        );
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Status { .. }));
    }

    #[test]
    fn transcription_and_translations() {
        let events = parse(
            r#"{
                "transcription":{"sentence_id":3,"text":"你好","is_sentence_end":false,"stash":{"text":"世界"}},
                "translations":{
                    "en":{"sentence_id":3,"text":"Hello","is_sentence_end":false},
                    "ja":{"sentence_id":3,"text":"こんにちは"}
                }
            }"#,
        );
        assert_eq!(events.len(), 3);
        match &events[0] {
            StreamEvent::Transcription(u) => {
                assert_eq!(u.sentence_id, 3);
                assert_eq!(u.stash.as_ref().map(|s| s.text.as_str()), Some("世界"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &events[1],
            StreamEvent::Translation { language, update } if language == "en" && update.text == "Hello"
        ));
        assert!(matches!(&events[2], StreamEvent::Translation { language, .. } if language == "ja"));
    }

    #[test]
    fn empty_message_yields_nothing() {
        assert!(parse("{}").is_empty());
    }

    #[test]
    fn invalid_session_close() {
        let ev = StreamEvent::Closed {
            code: Some(1008),
            reason: "invalid session".into(),
        };
        assert!(ev.is_invalid_session());
        let ev = StreamEvent::Closed {
            code: Some(1000),
            reason: String::new(),
        };
        assert!(!ev.is_invalid_session());
    }
}
