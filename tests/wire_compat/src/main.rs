fn main() {
    println!("Run `cargo test -p wire-compat` to check the JSON wire formats.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use voxbridge_protocol::messages::{
        CompleteUploadRequest, LanguagesResponse, SaveApiKeyRequest, SessionRequest,
        StartTranslationRequest, StartTranslationResponse, SyncTranslateResponse,
    };
    use voxbridge_protocol::{Ack, ApiResponse, StreamCommand, StreamMessage, StreamStatus};
    use voxbridge_session::TranscriptExport;

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Parses a fixture into `T`, serializes it back and compares the two
    /// JSON values. Returns the parsed value for further checks.
    fn roundtrip<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  ours: {reserialized}"
        );
        parsed
    }

    // --- HTTP requests ---

    #[test]
    fn start_translation_request() {
        let req: StartTranslationRequest = roundtrip("start_translation_request.json");
        assert_eq!(req.target_languages, ["en", "ja"]);
        assert!(req.use_microphone);
    }

    #[test]
    fn session_request() {
        roundtrip::<SessionRequest>("session_request.json");
    }

    #[test]
    fn save_api_key_request() {
        roundtrip::<SaveApiKeyRequest>("save_api_key_request.json");
    }

    #[test]
    fn complete_upload_request() {
        let req: CompleteUploadRequest = roundtrip("complete_upload_request.json");
        assert_eq!(req.total_chunks, 3);
    }

    // --- HTTP responses ---

    #[test]
    fn start_translation_response() {
        let resp: ApiResponse<StartTranslationResponse> =
            roundtrip("start_translation_response.json");
        assert!(resp.success);
        assert!(
            resp.data
                .websocket_url
                .as_deref()
                .is_some_and(|u| u.starts_with("ws://"))
        );
    }

    #[test]
    fn ack_failure() {
        let ack: Ack = roundtrip("ack_failure.json");
        assert_eq!(ack.into_result(), Err("disk full".to_string()));
    }

    #[test]
    fn languages_response() {
        let resp: ApiResponse<LanguagesResponse> = roundtrip("languages_response.json");
        assert_eq!(resp.data.languages["yue"], "Cantonese");
    }

    #[test]
    fn translate_file_sync_response() {
        let resp: ApiResponse<SyncTranslateResponse> =
            roundtrip("translate_file_sync_response.json");
        assert_eq!(resp.data.transcriptions.len(), 2);
        assert_eq!(resp.data.translations["ja"].len(), 2);
    }

    #[test]
    fn translate_file_sync_error_uses_error_field() {
        let resp: ApiResponse<SyncTranslateResponse> =
            roundtrip("translate_file_sync_error.json");
        assert_eq!(resp.failure_message(), "unsupported audio format");
    }

    #[test]
    fn ack_ignores_extra_fields() {
        let ack: Ack =
            serde_json::from_str(r#"{"success":true,"message":"ok","session_id":"x"}"#).unwrap();
        assert!(ack.success);
    }

    // --- Result stream ---

    #[test]
    fn stream_status() {
        let msg: StreamMessage = roundtrip("stream_status.json");
        assert_eq!(msg.status, Some(StreamStatus::Paused));
    }

    #[test]
    fn stream_result() {
        let msg: StreamMessage = roundtrip("stream_result.json");
        let transcription = msg.transcription.unwrap();
        assert_eq!(transcription.stash.unwrap().text, "开会");
        assert_eq!(msg.translations.len(), 2);
    }

    #[test]
    fn stream_command() {
        let cmd: StreamCommand = roundtrip("stream_command_stop.json");
        assert_eq!(cmd, StreamCommand::Stop);
    }

    #[test]
    fn unknown_stream_status_tolerated() {
        let msg: StreamMessage = serde_json::from_str(r#"{"status":"buffering"}"#).unwrap();
        assert_eq!(msg.status, Some(StreamStatus::Unknown));
    }

    // --- Export file ---

    #[test]
    fn transcript_export() {
        let export: TranscriptExport = roundtrip("transcript_export.json");
        assert!(!export.transcription[1].is_complete);
        assert_eq!(export.translations["en"][0].text, "Hello.");
    }
}
