//! Scripted WebSocket server.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Accepts one WebSocket client, sends `script`, then reports every text
/// frame it receives.
pub async fn ws_server(script: Vec<&'static str>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws/s-1", listener.local_addr().unwrap());
    let (seen_tx, seen_rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        for text in script {
            let _ = ws.send(Message::Text(text.into())).await;
        }
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                let _ = seen_tx.send(text.as_str().to_owned()).await;
            }
        }
    });

    (url, seen_rx)
}
