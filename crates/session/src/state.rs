//! Session lifecycle state machine.
//!
//! ```text
//! Idle → Starting → Running ⇄ Paused
//!           ↓          ↓         ↓
//!         Idle      Stopping ←───┘
//!                      ↓
//!                    Idle
//! ```

use std::fmt;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Running,
    Paused,
    /// A stop request is in flight; `was_paused` is where a rejected stop
    /// returns to.
    Stopping { was_paused: bool },
}

/// An input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Started,
    StartFailed,
    Pause,
    Resume,
    Stop,
    StopRejected,
    Stopped,
}

impl SessionPhase {
    /// The phase after `action`, or `None` if the action is not allowed here.
    pub fn next(self, action: SessionAction) -> Option<SessionPhase> {
        use SessionAction as A;
        use SessionPhase as P;

        match (self, action) {
            (P::Idle, A::Start) => Some(P::Starting),
            (P::Starting, A::Started) => Some(P::Running),
            (P::Starting, A::StartFailed) => Some(P::Idle),
            (P::Running, A::Pause) => Some(P::Paused),
            (P::Paused, A::Resume) => Some(P::Running),
            (P::Running, A::Stop) => Some(P::Stopping { was_paused: false }),
            (P::Paused, A::Stop) => Some(P::Stopping { was_paused: true }),
            (P::Stopping { was_paused: true }, A::StopRejected) => Some(P::Paused),
            (P::Stopping { was_paused: false }, A::StopRejected) => Some(P::Running),
            (P::Stopping { .. }, A::Stopped) => Some(P::Idle),
            _ => None,
        }
    }

    /// A session exists on the server side.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Paused | Self::Stopping { .. })
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused | Self::Stopping { was_paused: true })
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopping { .. } => "stopping",
        })
    }
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Started => "finish starting",
            Self::StartFailed => "abort start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
            Self::StopRejected => "cancel stop",
            Self::Stopped => "finish stopping",
        })
    }
}
