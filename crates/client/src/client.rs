//! Translation service API client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

use voxbridge_protocol::constants::{
    PATH_COMPLETE_UPLOAD, PATH_LANGUAGES, PATH_PAUSE_TRANSLATION, PATH_RESUME_TRANSLATION,
    PATH_SAVE_API_KEY, PATH_START_TRANSLATION, PATH_STOP_TRANSLATION, PATH_TRANSLATE_FILE_SYNC,
    PATH_UPLOAD_AUDIO, PATH_UPLOAD_CHUNK, fields,
};
use voxbridge_protocol::messages::{
    ChunkMeta, CompleteUploadRequest, LanguagesResponse, SaveApiKeyRequest, SessionRequest,
    StartTranslationRequest, StartTranslationResponse, StartedSession, SyncTranslateRequest,
    SyncTranslateResponse,
};
use voxbridge_protocol::{Ack, ApiResponse};

use crate::{ClientError, RetryPolicy};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout: None,
        }
    }
}

/// Translation service API client.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the server at `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and decodes the envelope.
    ///
    /// Non-success statuses become [`ClientError::Status`], using the
    /// body's `message`/`error` when it is an envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let resp = request.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: status_message(&body),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ClientError> {
        tracing::debug!(path, "POST");
        let resp = self.send(self.http.post(self.url(path)).json(body)).await?;
        checked(resp)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<ApiResponse<T>, ClientError> {
        tracing::debug!(path, "POST multipart");
        let resp = self
            .send(self.http.post(self.url(path)).multipart(form))
            .await?;
        checked(resp)
    }

    /// Lists the source languages the server accepts (code → display name).
    pub async fn languages(&self) -> Result<BTreeMap<String, String>, ClientError> {
        tracing::debug!(path = PATH_LANGUAGES, "GET");
        let resp: ApiResponse<LanguagesResponse> =
            self.send(self.http.get(self.url(PATH_LANGUAGES))).await?;
        Ok(checked(resp)?.data.languages)
    }

    /// Stores the API key server-side.
    pub async fn save_api_key(&self, api_key: &str) -> Result<Ack, ClientError> {
        require(api_key, "API key is required")?;
        let req = SaveApiKeyRequest {
            api_key: api_key.to_string(),
        };
        self.post_json(PATH_SAVE_API_KEY, &req).await
    }

    /// Starts a session. Validates the request before any network call.
    pub async fn start_translation(
        &self,
        req: &StartTranslationRequest,
    ) -> Result<StartedSession, ClientError> {
        require(&req.api_key, "API key is required")?;
        require(&req.source_language, "source language is required")?;
        if req.target_languages.is_empty() {
            return Err(ClientError::Validation(
                "at least one target language is required".into(),
            ));
        }

        let resp: ApiResponse<StartTranslationResponse> =
            self.post_json(PATH_START_TRANSLATION, req).await?;
        let data = resp.data;
        let session_id = data
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or(ClientError::MissingField("session_id"))?;
        let websocket_url = data
            .websocket_url
            .filter(|s| !s.is_empty())
            .ok_or(ClientError::MissingField("websocket_url"))?;

        tracing::info!(%session_id, "translation session started");
        Ok(StartedSession {
            session_id,
            websocket_url,
        })
    }

    pub async fn pause_translation(&self, session_id: &str) -> Result<Ack, ClientError> {
        self.session_call(PATH_PAUSE_TRANSLATION, session_id).await
    }

    pub async fn resume_translation(&self, session_id: &str) -> Result<Ack, ClientError> {
        self.session_call(PATH_RESUME_TRANSLATION, session_id).await
    }

    pub async fn stop_translation(&self, session_id: &str) -> Result<Ack, ClientError> {
        self.session_call(PATH_STOP_TRANSLATION, session_id).await
    }

    /// Stops a session, retrying transport failures per `policy`.
    ///
    /// A `success:false` answer is returned at once.
    pub async fn stop_translation_with_retry<R>(
        &self,
        session_id: &str,
        policy: &RetryPolicy,
        on_retry: R,
    ) -> Result<Ack, ClientError>
    where
        R: FnMut(u32, &ClientError),
    {
        policy
            .run(|| self.stop_translation(session_id), on_retry)
            .await
    }

    async fn session_call(&self, path: &str, session_id: &str) -> Result<Ack, ClientError> {
        require(session_id, "no active session")?;
        let req = SessionRequest {
            session_id: session_id.to_string(),
        };
        self.post_json(path, &req).await
    }

    /// Uploads a whole audio file into a running session.
    pub async fn upload_audio(
        &self,
        session_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Ack, ClientError> {
        require(session_id, "no active session")?;
        let form = Form::new()
            .part(fields::AUDIO_FILE, audio_part(bytes, filename))
            .text(fields::SESSION_ID, session_id.to_string());
        self.post_form(PATH_UPLOAD_AUDIO, form).await
    }

    /// Uploads one chunk of a chunked upload.
    pub async fn upload_chunk(&self, meta: &ChunkMeta, bytes: Vec<u8>) -> Result<Ack, ClientError> {
        let form = Form::new()
            .part(fields::CHUNK, audio_part(bytes, &meta.filename))
            .text(fields::SESSION_ID, meta.session_id.clone())
            .text(fields::FILENAME, meta.filename.clone())
            .text(fields::CHUNK_INDEX, meta.chunk_index.to_string())
            .text(fields::TOTAL_CHUNKS, meta.total_chunks.to_string());
        self.post_form(PATH_UPLOAD_CHUNK, form).await
    }

    /// Asks the server to assemble the uploaded chunks.
    pub async fn complete_upload(&self, req: &CompleteUploadRequest) -> Result<Ack, ClientError> {
        self.post_json(PATH_COMPLETE_UPLOAD, req).await
    }

    /// Translates a whole file in one request.
    pub async fn translate_file_sync(
        &self,
        req: &SyncTranslateRequest,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<SyncTranslateResponse, ClientError> {
        require(&req.api_key, "API key is required")?;
        require(&req.source_language, "source language is required")?;
        if req.target_languages.is_empty() {
            return Err(ClientError::Validation(
                "at least one target language is required".into(),
            ));
        }

        let form = Form::new()
            .part(fields::AUDIO_FILE, audio_part(bytes, filename))
            .text(fields::SOURCE_LANGUAGE, req.source_language.clone())
            .text(fields::TARGET_LANGUAGES, req.joined_targets())
            .text(fields::API_KEY, req.api_key.clone());
        let resp: ApiResponse<SyncTranslateResponse> =
            self.post_form(PATH_TRANSLATE_FILE_SYNC, form).await?;
        Ok(resp.data)
    }
}

/// Passes a successful envelope through; `success:false` becomes
/// [`ClientError::Rejected`].
fn checked<T>(resp: ApiResponse<T>) -> Result<ApiResponse<T>, ClientError> {
    if resp.success {
        Ok(resp)
    } else {
        Err(ClientError::Rejected {
            message: resp.failure_message(),
        })
    }
}

fn require(value: &str, message: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(())
}

fn audio_part(bytes: Vec<u8>, filename: &str) -> Part {
    Part::bytes(bytes).file_name(filename.to_string())
}

fn status_message(body: &str) -> String {
    match serde_json::from_str::<Ack>(body) {
        Ok(ack) => ack.failure_message(),
        Err(_) if body.trim().is_empty() => "empty response".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
