//! Scripted HTTP server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned replies for one path, served in order; the last one repeats.
pub struct Route {
    path: String,
    replies: Vec<(u16, String)>,
}

impl Route {
    pub fn new(path: &str, replies: &[(u16, &str)]) -> Self {
        Self {
            path: path.to_string(),
            replies: replies
                .iter()
                .map(|(status, body)| (*status, body.to_string()))
                .collect(),
        }
    }
}

/// Requests seen by [`http_server`], in arrival order.
#[derive(Clone, Default)]
pub struct Requests(Arc<Mutex<Vec<(String, Vec<u8>)>>>);

impl Requests {
    pub fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|(p, _)| p == path).count()
    }

    /// JSON body of the last request to `path`.
    pub fn body_of(&self, path: &str) -> Option<serde_json::Value> {
        let seen = self.0.lock().unwrap();
        let (_, body) = seen.iter().rev().find(|(p, _)| p == path)?;
        serde_json::from_slice(body).ok()
    }
}

/// Serves `routes`; unknown paths get a 404.
pub async fn http_server(routes: Vec<Route>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Requests::default();
    let seen = requests.clone();

    tokio::spawn(async move {
        let mut served: HashMap<String, usize> = HashMap::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let Some((path, body)) = read_request(&mut stream).await else {
                continue;
            };
            seen.0.lock().unwrap().push((path.clone(), body));

            let (status, reply) = match routes.iter().find(|r| r.path == path) {
                Some(route) => {
                    let n = served.entry(path).or_default();
                    let reply = route.replies[(*n).min(route.replies.len() - 1)].clone();
                    *n += 1;
                    reply
                }
                None => (404, r#"{"success":false,"message":"not found"}"#.to_string()),
            };
            let resp = format!(
                "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            let _ = stream.write_all(resp.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (url, requests)
}

async fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut tmp).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let path = head.split_whitespace().nth(1)?.to_string();
    let lower = head.to_ascii_lowercase();
    let length = lower
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok());
    let chunked = lower.contains("transfer-encoding: chunked");

    let mut body = buf[head_end..].to_vec();
    loop {
        let done = match length {
            Some(len) => body.len() >= len,
            None if chunked => body.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if done {
            break;
        }
        let n = stream.read(&mut tmp).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    Some((path, body))
}
