//! WebSocket client for the session result stream.

use std::time::Duration;

use futures_util::{Sink, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use voxbridge_protocol::StreamCommand;
use voxbridge_protocol::constants::{WS_MAX_MESSAGE_SIZE, WS_PING_PERIOD, WS_PONG_WAIT};

use crate::event::StreamEvent;
use crate::pumps::{ping::ping_pump, read::read_pump, write::write_pump};

/// Errors from the stream client.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stream URL: {0}")]
    InvalidUrl(String),

    #[error("invalid stream options: {0}")]
    InvalidOptions(String),

    #[error("connection closed")]
    Closed,
}

/// Keepalive and size limits for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// How often to ping the server.
    pub ping_period: Duration,
    /// How long the stream may stay silent before it is dropped. Must be
    /// longer than `ping_period` so pongs can keep it open.
    pub pong_wait: Duration,
    /// Largest text frame accepted, in bytes.
    pub max_message_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            ping_period: WS_PING_PERIOD,
            pong_wait: WS_PONG_WAIT,
            max_message_size: WS_MAX_MESSAGE_SIZE,
        }
    }
}

impl StreamOptions {
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.ping_period.is_zero() {
            return Err(StreamError::InvalidOptions("ping period must be positive".into()));
        }
        if self.pong_wait <= self.ping_period {
            return Err(StreamError::InvalidOptions(format!(
                "pong wait ({}s) must exceed the ping period ({}s)",
                self.pong_wait.as_secs_f64(),
                self.ping_period.as_secs_f64()
            )));
        }
        Ok(())
    }
}

/// Capacity of the event channel handed to the caller.
const EVENT_BUFFER: usize = 256;

/// A live connection to a session's result stream.
///
/// Events arrive on the receiver returned by [`connect`](Self::connect).
/// Dropping the client tears the connection down.
pub struct StreamClient {
    write_tx: mpsc::Sender<tungstenite::Message>,
    cancel: CancellationToken,
    read_handle: tokio::task::JoinHandle<()>,
    write_handle: tokio::task::JoinHandle<()>,
    ping_handle: tokio::task::JoinHandle<()>,
}

impl StreamClient {
    /// Connects to `url` (`ws://` or `wss://`) with default options.
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<StreamEvent>), StreamError> {
        Self::connect_with(url, StreamOptions::default()).await
    }

    pub async fn connect_with(
        url: &str,
        options: StreamOptions,
    ) -> Result<(Self, mpsc::Receiver<StreamEvent>), StreamError> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(StreamError::InvalidUrl(url.to_string()));
        }
        options.validate()?;

        let mut ws_config = tungstenite::protocol::WebSocketConfig::default();
        ws_config.max_message_size = Some(options.max_message_size);
        ws_config.max_frame_size = Some(options.max_message_size);
        let (ws_stream, _) =
            tokio_tungstenite::connect_async_with_config(url, Some(ws_config), false).await?;
        info!(url, ping_secs = options.ping_period.as_secs(), "result stream connected");

        let (write, read) = ws_stream.split();
        Ok(Self::spawn(write, read, options))
    }

    /// Starts the pumps over an already-open sink/stream pair.
    pub(crate) fn spawn<W, R>(
        write: W,
        read: R,
        options: StreamOptions,
    ) -> (Self, mpsc::Receiver<StreamEvent>)
    where
        W: Sink<tungstenite::Message, Error = tungstenite::Error> + Unpin + Send + 'static,
        R: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin + Send + 'static,
    {
        let (write_tx, write_rx) = mpsc::channel::<tungstenite::Message>(256);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        let write_handle = tokio::spawn(write_pump(write, write_rx, cancel.clone()));
        let read_handle = tokio::spawn(read_pump(
            read,
            events_tx,
            write_tx.clone(),
            options,
            cancel.clone(),
        ));
        let ping_handle = tokio::spawn(ping_pump(
            write_tx.clone(),
            options.ping_period,
            cancel.clone(),
        ));

        let client = Self {
            write_tx,
            cancel,
            read_handle,
            write_handle,
            ping_handle,
        };
        (client, events_rx)
    }

    /// Sends a pause/resume/stop command.
    pub async fn send_command(&self, command: StreamCommand) -> Result<(), StreamError> {
        let json = serde_json::to_string(&command)?;
        debug!(%json, "sending stream command");
        self.write_tx
            .send(tungstenite::Message::Text(json.into()))
            .await
            .map_err(|_| StreamError::Closed)
    }

    /// Returns `true` once the write side has shut down.
    pub fn is_closed(&self) -> bool {
        self.write_tx.is_closed()
    }

    /// Closes the connection gracefully: a close frame is sent, then the
    /// read and ping pumps stop.
    pub async fn close(&self) {
        let _ = self.write_tx.send(tungstenite::Message::Close(None)).await;
        self.cancel.cancel();
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.read_handle.abort();
        self.write_handle.abort();
        self.ping_handle.abort();
    }
}
