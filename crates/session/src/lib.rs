//! Translation session orchestration.
//!
//! [`SessionController`] owns one live session at a time: it drives the
//! HTTP lifecycle calls, holds the result stream, accumulates the
//! transcript and keeps the user-facing activity log. The caller feeds
//! stream and upload events back in through the `handle_*` methods and
//! renders the [`SessionEvent`]s it emits.

pub mod activity;
pub mod controller;
pub mod error;
pub mod state;
pub mod transcript;

pub use activity::{ActivityLog, LogEntry, LogLevel};
pub use controller::{
    ControllerOptions, InputMode, LiveChannels, SessionController, SessionEvent, SessionSettings,
};
pub use error::SessionError;
pub use state::{SessionAction, SessionPhase};
pub use transcript::{SentenceRecord, TranscriptBook, TranscriptExport, export_filename};
