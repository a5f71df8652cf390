use std::time::Duration;

/// Lists the source languages the service accepts.
pub const PATH_LANGUAGES: &str = "/api/languages";

/// Stores the API key in the server-side HTTP session.
pub const PATH_SAVE_API_KEY: &str = "/api/save_api_key";

/// Starts a translation session and returns its stream URL.
pub const PATH_START_TRANSLATION: &str = "/api/start_translation";

/// Pauses an active session.
pub const PATH_PAUSE_TRANSLATION: &str = "/api/pause_translation";

/// Resumes a paused session.
pub const PATH_RESUME_TRANSLATION: &str = "/api/resume_translation";

/// Stops a session and releases it on the server.
pub const PATH_STOP_TRANSLATION: &str = "/api/stop_translation";

/// Single-shot audio upload into an active session.
pub const PATH_UPLOAD_AUDIO: &str = "/upload_audio";

/// One part of a chunked upload.
pub const PATH_UPLOAD_CHUNK: &str = "/api/upload_chunk";

/// Completion handshake of a chunked upload.
pub const PATH_COMPLETE_UPLOAD: &str = "/api/complete_upload";

/// Whole-file translation answered in a single response.
pub const PATH_TRANSLATE_FILE_SYNC: &str = "/api/translate_file_sync";

/// Default chunk size for chunked uploads: 5 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Largest audio file the server accepts: 2 GiB.
pub const MAX_UPLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Audio file extensions the server accepts (lowercase, without the dot).
pub const ALLOWED_AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac", "aac", "pcm"];

/// Multipart field names used by the upload endpoints.
pub mod fields {
    pub const AUDIO_FILE: &str = "audio_file";
    pub const CHUNK: &str = "chunk";
    pub const SESSION_ID: &str = "session_id";
    pub const FILENAME: &str = "filename";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const TOTAL_CHUNKS: &str = "total_chunks";
    pub const SOURCE_LANGUAGE: &str = "source_language";
    pub const TARGET_LANGUAGES: &str = "target_languages";
    pub const API_KEY: &str = "api_key";
}

/// How often the client pings the result stream.
pub const WS_PING_PERIOD: Duration = Duration::from_secs(15);

/// Read deadline on the result stream.
///
/// Any incoming frame resets it. A paused session produces no results, so
/// this must stay well above [`WS_PING_PERIOD`] to let pongs keep it alive.
pub const WS_PONG_WAIT: Duration = Duration::from_secs(60);

/// Maximum accepted stream message size (1 MiB).
pub const WS_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Close code the server uses for an unknown session id.
pub const WS_CLOSE_INVALID_SESSION: u16 = 1008;
