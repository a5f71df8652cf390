//! The session controller: one live translation session at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxbridge_client::{ApiClient, ClientError, RetryPolicy};
use voxbridge_protocol::languages::{fallback_languages, is_supported_direction};
use voxbridge_protocol::messages::{
    StartTranslationRequest, SyncTranslateRequest, SyncTranslateResponse,
};
use voxbridge_protocol::{StreamCommand, StreamStatus};
use voxbridge_stream::{StreamClient, StreamEvent, StreamOptions};
use voxbridge_transfer::{format_size, validate_audio_file};
use voxbridge_upload::{FileUploader, UploadEvent, UploadOptions, UploadReport};

use crate::activity::{ActivityLog, DEFAULT_LOG_CAPACITY, LogEntry, LogLevel};
use crate::error::SessionError;
use crate::state::{SessionAction, SessionPhase};
use crate::transcript::{SentenceRecord, TranscriptBook};

const UPLOAD_EVENT_BUFFER: usize = 64;

/// Where session audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Microphone,
    /// A file uploaded once the session is running. `None` starts the
    /// session without one.
    File(Option<PathBuf>),
}

/// What the user chose for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub api_key: String,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub input: InputMode,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub upload: UploadOptions,
    pub stream: StreamOptions,
    pub stop_retry: RetryPolicy,
    pub log_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            upload: UploadOptions::default(),
            stream: StreamOptions::default(),
            stop_retry: RetryPolicy::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Something the front-end should render.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Log(LogEntry),
    PhaseChanged(SessionPhase),
    /// A sentence changed. `language` is `None` for the transcription.
    TranscriptUpdated {
        language: Option<String>,
        sentence: SentenceRecord,
    },
    Upload(UploadEvent),
}

/// Receivers for a freshly started session.
///
/// Feed what arrives back into [`SessionController::handle_stream_event`]
/// and [`SessionController::handle_upload_event`].
#[derive(Debug)]
pub struct LiveChannels {
    pub stream: mpsc::Receiver<StreamEvent>,
    pub upload: Option<mpsc::Receiver<UploadEvent>>,
}

struct ActiveSession {
    session_id: String,
    stream: Option<StreamClient>,
}

/// Drives a translation session and keeps its transcript and log.
pub struct SessionController {
    client: Arc<ApiClient>,
    options: ControllerOptions,
    phase: SessionPhase,
    active: Option<ActiveSession>,
    source_language: Option<String>,
    transcript: TranscriptBook,
    log: ActivityLog,
    events: mpsc::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        client: Arc<ApiClient>,
        options: ControllerOptions,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            client,
            options,
            phase: SessionPhase::Idle,
            active: None,
            source_language: None,
            transcript: TranscriptBook::new(),
            log: ActivityLog::new(options.log_capacity),
            events,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn session_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.session_id.as_str())
    }

    pub fn transcript(&self) -> &TranscriptBook {
        &self.transcript
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.log
    }

    /// Empties the activity log.
    pub fn clear_log(&mut self) {
        let note = self.log.clear().clone();
        emit(&self.events, SessionEvent::Log(note));
    }

    /// Fetches the selectable source languages; falls back to the built-in
    /// list when the server cannot be asked.
    pub async fn load_languages(&mut self) -> BTreeMap<String, String> {
        match self.client.languages().await {
            Ok(languages) if !languages.is_empty() => {
                debug!(count = languages.len(), "languages loaded");
                languages
            }
            Ok(_) => {
                self.log(LogLevel::Warning, "server listed no languages, using defaults");
                fallback_languages()
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to load languages: {e}"));
                fallback_languages()
            }
        }
    }

    pub async fn save_api_key(&mut self, api_key: &str) -> Result<(), SessionError> {
        if api_key.trim().is_empty() {
            return Err(self.refuse("API key must not be empty"));
        }
        match self.client.save_api_key(api_key).await {
            Ok(_) => {
                self.log(LogLevel::Success, "API key saved");
                Ok(())
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to save API key: {e}"));
                Err(e.into())
            }
        }
    }

    /// Starts a session and connects its result stream.
    ///
    /// In file mode the upload runs in the background; its progress
    /// arrives on [`LiveChannels::upload`].
    pub async fn start(&mut self, settings: SessionSettings) -> Result<LiveChannels, SessionError> {
        self.check(SessionAction::Start)?;
        self.validate_start(&settings)?;

        self.transition(SessionAction::Start)?;
        self.transcript.clear();
        self.source_language = Some(settings.source_language.clone());
        self.log(LogLevel::Info, "starting translation");

        let req = StartTranslationRequest {
            api_key: settings.api_key.clone(),
            source_language: settings.source_language.clone(),
            target_languages: settings.target_languages.clone(),
            use_microphone: settings.input == InputMode::Microphone,
        };
        let started = match self.client.start_translation(&req).await {
            Ok(started) => started,
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to start translation: {e}"));
                self.transition(SessionAction::StartFailed)?;
                return Err(e.into());
            }
        };

        let connected = StreamClient::connect_with(&started.websocket_url, self.options.stream).await;
        let (stream, stream_rx) = match connected {
            Ok(pair) => pair,
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to open result stream: {e}"));
                // The server already holds a session; let it go.
                if let Err(stop_err) = self.client.stop_translation(&started.session_id).await {
                    warn!(session_id = %started.session_id, error = %stop_err, "could not release session");
                }
                self.transition(SessionAction::StartFailed)?;
                return Err(e.into());
            }
        };

        info!(session_id = %started.session_id, "session running");
        self.active = Some(ActiveSession {
            session_id: started.session_id.clone(),
            stream: Some(stream),
        });
        self.transition(SessionAction::Started)?;
        self.log(LogLevel::Success, "translation started");

        let upload = match settings.input {
            InputMode::Microphone => None,
            InputMode::File(None) => {
                self.log(LogLevel::Warning, "no audio file selected");
                None
            }
            InputMode::File(Some(path)) => Some(self.spawn_upload(path, started.session_id)),
        };

        Ok(LiveChannels {
            stream: stream_rx,
            upload,
        })
    }

    pub async fn pause(&mut self) -> Result<(), SessionError> {
        let session_id = self.require_session()?;
        if self.phase.is_paused() {
            self.log(LogLevel::Warning, "translation is already paused");
            return Err(self.invalid(SessionAction::Pause));
        }
        self.check(SessionAction::Pause)?;

        match self.client.pause_translation(&session_id).await {
            Ok(_) => {
                self.transition(SessionAction::Pause)?;
                self.send_command(StreamCommand::Pause).await;
                self.log(LogLevel::Info, "translation paused");
                Ok(())
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to pause translation: {e}"));
                Err(e.into())
            }
        }
    }

    pub async fn resume(&mut self) -> Result<(), SessionError> {
        let session_id = self.require_session()?;
        if self.phase != SessionPhase::Paused {
            self.log(LogLevel::Warning, "translation is not paused");
            return Err(self.invalid(SessionAction::Resume));
        }

        match self.client.resume_translation(&session_id).await {
            Ok(_) => {
                self.transition(SessionAction::Resume)?;
                self.send_command(StreamCommand::Resume).await;
                self.log(LogLevel::Info, "translation resumed");
                Ok(())
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to resume translation: {e}"));
                Err(e.into())
            }
        }
    }

    /// Stops the session: `stop` over the stream, then the HTTP stop with
    /// bounded retry.
    ///
    /// A refusal from the server keeps the session. Running out of retries
    /// drops it locally anyway.
    pub async fn stop(&mut self) -> Result<(), SessionError> {
        let session_id = self.require_session()?;
        self.check(SessionAction::Stop)?;
        self.transition(SessionAction::Stop)?;

        self.send_command(StreamCommand::Stop).await;
        self.log(LogLevel::Info, "stopping translation");

        let client = Arc::clone(&self.client);
        let policy = self.options.stop_retry;
        let log = &mut self.log;
        let events = &self.events;
        let outcome = client
            .stop_translation_with_retry(&session_id, &policy, |attempt, _| {
                let entry = log
                    .push(
                        LogLevel::Warning,
                        format!(
                            "stop request failed, retrying ({attempt}/{})",
                            policy.max_retries
                        ),
                    )
                    .clone();
                emit(events, SessionEvent::Log(entry));
            })
            .await;

        match outcome {
            Ok(_) => {
                self.log(LogLevel::Info, "translation stopped");
                self.end_session().await?;
                Ok(())
            }
            Err(e) if e.is_transport() => {
                self.log(LogLevel::Error, format!("failed to stop translation: {e}"));
                self.end_session().await?;
                Err(e.into())
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("failed to stop translation: {e}"));
                self.transition(SessionAction::StopRejected)?;
                Err(e.into())
            }
        }
    }

    /// Applies one event from the result stream.
    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Status { status, message } => self.on_status(status, message),
            StreamEvent::Transcription(update) => {
                let sentence = self.transcript.upsert_transcription(&update).clone();
                emit(&self.events, SessionEvent::TranscriptUpdated {
                    language: None,
                    sentence,
                });
            }
            StreamEvent::Translation { language, update } => {
                let sentence = self.transcript.upsert_translation(&language, &update).clone();
                emit(&self.events, SessionEvent::TranscriptUpdated {
                    language: Some(language),
                    sentence,
                });
            }
            StreamEvent::Malformed(reason) => {
                self.log(LogLevel::Error, format!("failed to process message: {reason}"));
            }
            StreamEvent::Closed { code, reason } => {
                if let Some(active) = &mut self.active {
                    active.stream = None;
                }
                let text = match code {
                    Some(code) => format!("result stream closed (code {code})"),
                    None => "result stream closed".to_string(),
                };
                debug!(?code, %reason, "result stream closed");
                self.log(LogLevel::Info, text);
                if code == Some(voxbridge_protocol::constants::WS_CLOSE_INVALID_SESSION) {
                    self.log(LogLevel::Error, "server does not recognize this session");
                }
            }
        }
    }

    /// Logs and forwards progress from a background upload.
    pub fn handle_upload_event(&mut self, event: UploadEvent) {
        match &event {
            UploadEvent::Started {
                filename,
                file_size,
                total_chunks,
            } => {
                self.log(LogLevel::Info, format!("uploading {filename}"));
                let size = format!("file size: {}", format_size(*file_size));
                if *total_chunks > 0 {
                    self.log(LogLevel::Info, format!("{size} in {total_chunks} chunks"));
                } else {
                    self.log(LogLevel::Info, size);
                }
            }
            UploadEvent::ChunkAcked { .. } => {}
            UploadEvent::Assembling { total_chunks } => {
                self.log(
                    LogLevel::Info,
                    format!("all {total_chunks} chunks uploaded, assembling"),
                );
            }
            UploadEvent::Completed { filename, .. } => {
                self.log(LogLevel::Success, format!("{filename} uploaded and processed"));
            }
            UploadEvent::Failed { message } => {
                self.log(LogLevel::Error, format!("upload failed: {message}"));
            }
        }
        emit(&self.events, SessionEvent::Upload(event));
    }

    /// Uploads `path` into the running session and waits for the result.
    pub async fn upload_file(&mut self, path: &Path) -> Result<UploadReport, SessionError> {
        let session_id = self.require_session()?;
        let (tx, mut rx) = mpsc::channel(UPLOAD_EVENT_BUFFER);
        let client = Arc::clone(&self.client);
        let options = self.options.upload;

        let upload = async move {
            FileUploader::new(&*client, options)
                .upload_file(path, &session_id, &tx)
                .await
        };
        let drain = async {
            while let Some(event) = rx.recv().await {
                self.handle_upload_event(event);
            }
        };
        let (result, ()) = tokio::join!(upload, drain);
        Ok(result?)
    }

    /// Writes the transcript as JSON into `dir`.
    pub fn export(&mut self, dir: &Path) -> Result<PathBuf, SessionError> {
        let source = self.source_language.clone().unwrap_or_default();
        match self.transcript.write_export(&source, dir) {
            Ok(path) => {
                self.log(
                    LogLevel::Success,
                    format!("transcript exported to {}", path.display()),
                );
                Ok(path)
            }
            Err(SessionError::NothingToExport) => {
                self.log(LogLevel::Warning, "nothing to export");
                Err(SessionError::NothingToExport)
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("export failed: {e}"));
                Err(e)
            }
        }
    }

    /// Translates a whole file in one request, outside any live session.
    pub async fn translate_file(
        &mut self,
        request: &SyncTranslateRequest,
        path: &Path,
    ) -> Result<SyncTranslateResponse, SessionError> {
        if request.api_key.trim().is_empty() {
            return Err(self.refuse("set an API key first"));
        }
        if request.source_language.is_empty() {
            return Err(self.refuse("select a source language"));
        }
        if request.target_languages.is_empty() {
            return Err(self.refuse("select at least one target language"));
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.log(LogLevel::Error, format!("cannot read {}: {e}", path.display()));
                return Err(e.into());
            }
        };
        if let Err(e) = validate_audio_file(&filename, bytes.len() as u64) {
            return Err(self.refuse(&e.to_string()));
        }

        self.log(LogLevel::Info, "starting file translation");
        match self
            .client
            .translate_file_sync(request, &filename, bytes)
            .await
        {
            Ok(result) => {
                self.log(LogLevel::Success, "file translation complete");
                Ok(result)
            }
            Err(ClientError::Rejected { message }) => {
                self.log(LogLevel::Error, format!("file translation failed: {message}"));
                Err(ClientError::Rejected { message }.into())
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("request failed: {e}"));
                Err(e.into())
            }
        }
    }

    fn validate_start(&mut self, settings: &SessionSettings) -> Result<(), SessionError> {
        if settings.source_language.is_empty() {
            return Err(self.refuse("select a source language"));
        }
        if settings.target_languages.is_empty() {
            return Err(self.refuse("select at least one target language"));
        }
        if let Some(target) = settings
            .target_languages
            .iter()
            .find(|t| !is_supported_direction(&settings.source_language, t))
        {
            let msg = format!(
                "cannot translate {} into {target}",
                settings.source_language
            );
            return Err(self.refuse(&msg));
        }
        if settings.api_key.trim().is_empty() {
            return Err(self.refuse("set an API key first"));
        }
        Ok(())
    }

    fn spawn_upload(&self, path: PathBuf, session_id: String) -> mpsc::Receiver<UploadEvent> {
        let (tx, rx) = mpsc::channel(UPLOAD_EVENT_BUFFER);
        let client = Arc::clone(&self.client);
        let options = self.options.upload;
        tokio::spawn(async move {
            let result = FileUploader::new(&*client, options)
                .upload_file(&path, &session_id, &tx)
                .await;
            if let Err(e) = result {
                debug!(error = %e, "background upload ended with error");
            }
        });
        rx
    }

    async fn send_command(&self, command: StreamCommand) {
        let Some(stream) = self.active.as_ref().and_then(|a| a.stream.as_ref()) else {
            return;
        };
        if let Err(e) = stream.send_command(command).await {
            warn!(?command, error = %e, "stream command not sent");
        }
    }

    async fn end_session(&mut self) -> Result<(), SessionError> {
        if let Some(active) = self.active.take()
            && let Some(stream) = active.stream
        {
            stream.close().await;
        }
        self.transition(SessionAction::Stopped)
    }

    fn on_status(&mut self, status: StreamStatus, message: Option<String>) {
        let (level, default) = match status {
            StreamStatus::Error => {
                let msg = message.as_deref().unwrap_or(voxbridge_protocol::envelope::UNKNOWN_ERROR);
                self.log(LogLevel::Error, format!("translation error: {msg}"));
                return;
            }
            StreamStatus::Complete => (LogLevel::Success, "translation complete"),
            StreamStatus::Connected => (LogLevel::Success, "result stream connected"),
            StreamStatus::Paused => (LogLevel::Info, "translation paused"),
            StreamStatus::Resumed => (LogLevel::Info, "translation resumed"),
            StreamStatus::Stopped => (LogLevel::Info, "translation stopped"),
            StreamStatus::Unknown => {
                debug!(?message, "unknown stream status");
                return;
            }
        };
        self.log(level, default);
    }

    fn require_session(&mut self) -> Result<String, SessionError> {
        match self.session_id() {
            Some(id) => Ok(id.to_string()),
            None => {
                self.log(LogLevel::Error, "no active translation session");
                Err(SessionError::NoSession)
            }
        }
    }

    fn check(&mut self, action: SessionAction) -> Result<(), SessionError> {
        if self.phase.next(action).is_some() {
            return Ok(());
        }
        let err = self.invalid(action);
        self.log(LogLevel::Warning, err.to_string());
        Err(err)
    }

    fn invalid(&self, action: SessionAction) -> SessionError {
        SessionError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    fn transition(&mut self, action: SessionAction) -> Result<(), SessionError> {
        let next = self.phase.next(action).ok_or_else(|| self.invalid(action))?;
        debug!(from = %self.phase, to = %next, %action, "session phase change");
        self.phase = next;
        emit(&self.events, SessionEvent::PhaseChanged(next));
        Ok(())
    }

    fn refuse(&mut self, message: &str) -> SessionError {
        self.log(LogLevel::Error, message);
        SessionError::Validation(message.to_string())
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = self.log.push(level, message).clone();
        emit(&self.events, SessionEvent::Log(entry));
    }
}

/// Never blocks: a full or closed channel drops the event.
fn emit(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = events.try_send(event) {
        debug!("session event dropped: {e}");
    }
}
