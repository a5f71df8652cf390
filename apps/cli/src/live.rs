//! Interactive live session: stream results, read commands from stdin.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;

use voxbridge_session::{LiveChannels, SessionController, SessionPhase, SessionSettings};

/// A line typed during a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveCommand {
    Pause,
    Resume,
    Stop,
    Export,
    Clear,
    Status,
    Upload(PathBuf),
    Help,
}

impl FromStr for LiveCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word.to_ascii_lowercase().as_str() {
            "pause" | "p" => Ok(Self::Pause),
            "resume" | "r" => Ok(Self::Resume),
            "stop" | "quit" | "q" => Ok(Self::Stop),
            "export" | "e" => Ok(Self::Export),
            "clear" => Ok(Self::Clear),
            "status" | "s" => Ok(Self::Status),
            "upload" | "u" if !rest.is_empty() => Ok(Self::Upload(PathBuf::from(rest))),
            "upload" | "u" => Err("usage: upload <path>".into()),
            "help" | "h" | "?" => Ok(Self::Help),
            other => Err(format!("unknown command: {other} (try `help`)")),
        }
    }
}

const HELP: &str = "commands: pause | resume | stop | export | clear | status | upload <path> | help";

/// Runs the session until it is stopped. Ctrl-C and end of input stop it.
pub async fn run(
    ctl: &mut SessionController,
    settings: SessionSettings,
    export_dir: &Path,
) -> anyhow::Result<()> {
    let channels = ctl.start(settings).await?;
    println!("{HELP}");
    drive(ctl, channels, BufReader::new(tokio::io::stdin()), export_dir).await
}

/// Feeds stream and upload events into `ctl` and executes commands read
/// from `input` until the session is idle.
///
/// Input is read up to its end once. If the stop issued at end of input is
/// refused, the loop gives up instead of asking again.
async fn drive<R>(
    ctl: &mut SessionController,
    channels: LiveChannels,
    input: R,
    export_dir: &Path,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut stream = Some(channels.stream);
    let mut upload = channels.upload;
    let mut lines = Some(input.lines());

    while ctl.phase() != SessionPhase::Idle {
        tokio::select! {
            event = next_event(&mut stream) => match event {
                Some(event) => ctl.handle_stream_event(event),
                None => stream = None,
            },
            event = next_event(&mut upload) => match event {
                Some(event) => ctl.handle_upload_event(event),
                None => upload = None,
            },
            line = next_line(&mut lines) => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<LiveCommand>() {
                    Ok(command) => execute(ctl, command, export_dir).await,
                    Err(e) => println!("{e}"),
                },
                None => {
                    lines = None;
                    if let Err(e) = ctl.stop().await {
                        if ctl.phase() != SessionPhase::Idle {
                            anyhow::bail!("input closed and the session could not be stopped: {e}");
                        }
                    }
                }
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = ctl.stop().await;
            }
        }
    }
    Ok(())
}

async fn execute(ctl: &mut SessionController, command: LiveCommand, export_dir: &Path) {
    // Failures are already in the activity log.
    let _ = match command {
        LiveCommand::Pause => ctl.pause().await,
        LiveCommand::Resume => ctl.resume().await,
        LiveCommand::Stop => ctl.stop().await,
        LiveCommand::Export => ctl.export(export_dir).map(|_| ()),
        LiveCommand::Upload(path) => ctl.upload_file(&path).await.map(|_| ()),
        LiveCommand::Clear => {
            ctl.clear_log();
            Ok(())
        }
        LiveCommand::Status => {
            println!(
                "phase: {}, session: {}, sentences: {}",
                ctl.phase(),
                ctl.session_id().unwrap_or("-"),
                ctl.transcript().transcription().len()
            );
            Ok(())
        }
        LiveCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
    };
}

/// Next line of input; pends forever once input has ended.
async fn next_line<R>(lines: &mut Option<Lines<R>>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// Next item from an optional receiver; pends forever once it is gone.
async fn next_event<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use voxbridge_client::{ApiClient, ClientConfig};
    use voxbridge_session::{ControllerOptions, InputMode};
    use voxbridge_test_utils::{Requests, Route, http_server, ws_server};

    const START_OK: &str = r#"{"success":true,"session_id":"s-1","websocket_url":"WS"}"#;

    /// A running session whose stop endpoint answers `stop_reply`.
    async fn live_session(stop_reply: &str) -> (SessionController, LiveChannels, Requests) {
        let (ws_url, _seen) = ws_server(vec![]).await;
        let start = START_OK.replace("WS", &ws_url);
        let (url, requests) = http_server(vec![
            Route::new("/api/start_translation", &[(200, start.as_str())]),
            Route::new("/api/stop_translation", &[(200, stop_reply)]),
        ])
        .await;

        let client = ApiClient::new(&ClientConfig {
            base_url: url,
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        let (tx, _rx) = mpsc::channel(1024);
        let mut ctl = SessionController::new(Arc::new(client), ControllerOptions::default(), tx);
        let channels = ctl
            .start(SessionSettings {
                api_key: "sk-test".into(),
                source_language: "zh".into(),
                target_languages: vec!["en".into()],
                input: InputMode::Microphone,
            })
            .await
            .unwrap();
        (ctl, channels, requests)
    }

    #[tokio::test]
    async fn end_of_input_stops_session() {
        let (mut ctl, channels, requests) = live_session(r#"{"success":true}"#).await;
        let dir = tempfile::tempdir().unwrap();

        let input: &[u8] = b"status\n\n";
        tokio::time::timeout(
            Duration::from_secs(5),
            drive(&mut ctl, channels, input, dir.path()),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(ctl.phase(), SessionPhase::Idle);
        assert_eq!(requests.count("/api/stop_translation"), 1);
    }

    #[tokio::test]
    async fn refused_stop_at_end_of_input_is_not_repeated() {
        let (mut ctl, channels, requests) =
            live_session(r#"{"success":false,"message":"still processing"}"#).await;
        let dir = tempfile::tempdir().unwrap();

        let input: &[u8] = b"";
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            drive(&mut ctl, channels, input, dir.path()),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert!(err.to_string().contains("still processing"), "{err}");
        assert_eq!(requests.count("/api/stop_translation"), 1);
        assert_eq!(ctl.phase(), SessionPhase::Running);
    }

    #[test]
    fn parses_commands() {
        assert_eq!("pause".parse(), Ok(LiveCommand::Pause));
        assert_eq!(" RESUME ".parse(), Ok(LiveCommand::Resume));
        assert_eq!("q".parse(), Ok(LiveCommand::Stop));
        assert_eq!("export".parse(), Ok(LiveCommand::Export));
        assert_eq!("?".parse(), Ok(LiveCommand::Help));
        assert_eq!(
            "upload  /tmp/my talk.wav".parse(),
            Ok(LiveCommand::Upload(PathBuf::from("/tmp/my talk.wav")))
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete() {
        assert!("dance".parse::<LiveCommand>().unwrap_err().contains("dance"));
        assert!("upload".parse::<LiveCommand>().is_err());
    }

    #[tokio::test]
    async fn closed_receiver_reports_end() {
        let (tx, rx) = mpsc::channel::<u8>(1);
        drop(tx);
        let mut rx = Some(rx);
        assert_eq!(next_event(&mut rx).await, None);
    }
}
