//! Refractor console - client library for the Refractor moderation backend
//!
//! Talks to the backend over REST and a live WebSocket, keeps per-entity
//! state in observable stores, and decodes the permission masks the backend
//! hands out. [`AppContext`] wires everything together.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod notify;
pub mod permissions;
pub mod ringbuf;
pub mod socket;
pub mod stores;

pub use api::ApiClient;
pub use config::{EnvConfig, SocketConfig};
pub use context::AppContext;
pub use error::{ApiError, ApiResult, RefractorError, Result};
pub use notify::{Notifier, Toast, ToastLevel};
pub use permissions::{PermissionMask, PermissionRegistry};
pub use socket::{ConnectionState, LiveEvent, SocketClient};
pub use stores::Submission;
