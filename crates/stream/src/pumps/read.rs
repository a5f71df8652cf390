//! Read pump: decodes incoming frames into stream events.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use voxbridge_protocol::StreamMessage;

use crate::client::StreamOptions;
use crate::event::{StreamEvent, events_from_message};

/// Reads frames until the stream ends, is cancelled, or goes silent for
/// `options.pong_wait`.
///
/// Any incoming frame resets the deadline. Every exit except cancellation
/// ends with a [`StreamEvent::Closed`].
pub(crate) async fn read_pump<S>(
    mut read: S,
    events_tx: mpsc::Sender<StreamEvent>,
    write_tx: mpsc::Sender<tungstenite::Message>,
    options: StreamOptions,
    cancel: CancellationToken,
) where
    S: StreamExt<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
{
    let pong_wait = options.pong_wait;
    let deadline = tokio::time::sleep(pong_wait);
    tokio::pin!(deadline);

    let closed = loop {
        tokio::select! {
            _ = cancel.cancelled() => return,

            () = &mut deadline => {
                warn!("no frames within {}s, dropping stream", pong_wait.as_secs());
                break StreamEvent::Closed { code: None, reason: "read timeout".into() };
            }

            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        warn!("stream read error: {e}");
                        break StreamEvent::Closed { code: None, reason: e.to_string() };
                    }
                    None => {
                        debug!("stream ended");
                        break StreamEvent::Closed { code: None, reason: "stream ended".into() };
                    }
                };
                deadline.as_mut().reset(tokio::time::Instant::now() + pong_wait);

                match msg {
                    tungstenite::Message::Text(text) => {
                        for event in decode_text(text.as_str(), options.max_message_size) {
                            if events_tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    }
                    tungstenite::Message::Ping(data) => {
                        trace!("received ping, sending pong");
                        let _ = write_tx.send(tungstenite::Message::Pong(data)).await;
                    }
                    tungstenite::Message::Pong(_) => trace!("received pong"),
                    tungstenite::Message::Close(frame) => {
                        let (code, reason) = match frame {
                            Some(f) => (Some(u16::from(f.code)), f.reason.as_str().to_owned()),
                            None => (None, String::new()),
                        };
                        debug!(?code, %reason, "received close frame");
                        break StreamEvent::Closed { code, reason };
                    }
                    _ => {}
                }
            }
        }
    };

    let _ = events_tx.send(closed).await;
}

/// Decodes one text frame.
fn decode_text(text: &str, max_size: usize) -> Vec<StreamEvent> {
    if text.len() > max_size {
        warn!("message too large ({} bytes), dropping", text.len());
        return vec![StreamEvent::Malformed(format!(
            "message too large ({} bytes)",
            text.len()
        ))];
    }

    match serde_json::from_str::<StreamMessage>(text) {
        Ok(msg) => events_from_message(msg),
        Err(e) => {
            warn!("failed to parse stream message: {e}");
            vec![StreamEvent::Malformed(e.to_string())]
        }
    }
}
