//! Terminal output for session events.

use tokio::sync::mpsc;

use voxbridge_protocol::languages::display_name;
use voxbridge_session::SessionEvent;
use voxbridge_transfer::{SpeedCalculator, format_size};
use voxbridge_upload::UploadEvent;

/// Turns events into printable lines, tracking upload speed on the way.
pub struct Renderer {
    chunk_size: u64,
    file_size: u64,
    speed: SpeedCalculator,
}

impl Renderer {
    pub fn new(chunk_size: u64) -> Self {
        Self {
            chunk_size,
            file_size: 0,
            speed: SpeedCalculator::default(),
        }
    }

    /// The line to print for `event`, if any.
    pub fn line(&mut self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::Log(entry) => Some(entry.to_string()),
            SessionEvent::PhaseChanged(phase) => {
                tracing::debug!(%phase, "phase changed");
                None
            }
            SessionEvent::TranscriptUpdated { language, sentence } => {
                if !sentence.is_complete {
                    return None;
                }
                let label = match language {
                    Some(code) => display_name(code).to_string(),
                    None => "transcript".to_string(),
                };
                Some(format!("  {label:>10} | {}", sentence.text))
            }
            SessionEvent::Upload(upload) => self.upload_line(upload),
        }
    }

    fn upload_line(&mut self, event: &UploadEvent) -> Option<String> {
        match event {
            UploadEvent::Started { file_size, .. } => {
                self.file_size = *file_size;
                self.speed.reset();
                None
            }
            UploadEvent::ChunkAcked {
                index,
                total,
                percent,
            } => {
                let offset = index * self.chunk_size;
                let len = self.chunk_size.min(self.file_size.saturating_sub(offset));
                self.speed.add_sample(len);

                let sent = (offset + len).min(self.file_size);
                let mut line = format!(
                    "upload progress: {percent:.2}% ({}/{total}, {} of {})",
                    index + 1,
                    format_size(sent),
                    format_size(self.file_size)
                );
                if let Some(eta) = self.speed.eta(self.file_size - sent) {
                    line.push_str(&format!(", ~{}s left", eta.as_secs()));
                }
                Some(line)
            }
            _ => None,
        }
    }
}

/// Prints events until every sender is gone.
pub async fn render(mut events: mpsc::Receiver<SessionEvent>, chunk_size: u64) {
    let mut renderer = Renderer::new(chunk_size);
    while let Some(event) = events.recv().await {
        if let Some(line) = renderer.line(&event) {
            println!("{line}");
        }
    }
}
