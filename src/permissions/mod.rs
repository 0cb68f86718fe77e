//! Permission flags and masks
//!
//! Each named permission occupies one bit of a [`PermissionMask`]. Bits are
//! handed out by ascending ordinal at registration time:
//! - `FLAG_SUPER_ADMIN`: passes every check
//! - `FLAG_ADMINISTRATOR`: passes `has_all_of`/`has_one_of` when the caller
//!   opts into the admin bypass
//! - everything else: plain bit tests

pub mod flags;
mod mask;
mod registry;

pub use mask::{PermissionMask, MAX_FLAGS};
pub use registry::{Flag, PermissionDef, PermissionRegistry};

use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// Registry shared between the stores; replaced wholesale when the backend
/// sends its permission list
pub type SharedRegistry = Arc<RwLock<PermissionRegistry>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("unknown permission flag: {0}")]
    UnknownFlag(String),

    #[error("permission {0} registered twice")]
    DuplicateName(String),

    #[error("permission id {0} registered twice")]
    DuplicateId(u32),

    #[error("{0} permissions exceed the {max} bit mask", max = MAX_FLAGS)]
    TooManyFlags(usize),
}
