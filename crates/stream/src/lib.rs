//! Result stream client.
//!
//! Connects to the session's WebSocket, turns server messages into typed
//! [`StreamEvent`]s and sends pause/resume/stop commands. Three pumps run
//! per connection: read, write and ping.

pub mod client;
pub mod event;
mod pumps;

pub use client::{StreamClient, StreamError, StreamOptions};
pub use event::StreamEvent;
