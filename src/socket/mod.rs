//! Live updates over a single WebSocket
//!
//! The client keeps one connection open, pings it every `ping_interval`,
//! and after an unexpected close retries with [`Backoff`] until it gets back
//! in. Decoded events are handed to a [`LiveEventSink`], normally the
//! application's stores.

mod backoff;
mod client;
pub mod messages;

pub use backoff::Backoff;
pub use client::{ConnectionState, SocketClient, CONNECTION_LOST_MESSAGE, RECONNECTED_MESSAGE};
pub use messages::{ClientMessage, LiveEvent};

/// Receiver of decoded socket events
///
/// Called on the connection task; implementations must not block.
pub trait LiveEventSink: Send + Sync + 'static {
    fn handle(&self, event: &LiveEvent);
}
