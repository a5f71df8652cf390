//! Test infrastructure for voxbridge.
//!
//! Provides:
//! - `http_server`: local HTTP server answering each path from a reply script
//! - `ws_server`: local result stream that plays frames and records commands

mod http;
mod ws;

pub use http::{Requests, Route, http_server};
pub use ws::ws_server;
