//! Error types for the pmxlock crate.
//!
//! Uses thiserror for derive macros. Contention is never an error: a busy
//! lock surfaces as `Ok(false)` from the acquire operations, and blocking
//! wrappers retry it. The variants here cover the small closed set of causes
//! the lock protocols distinguish:
//!
//! - `NotFound` / `PermissionDenied`: used as control-flow signals by the
//!   recoverable directory lock to distinguish "the lock does not exist yet"
//!   from "someone else owns it" during a renewal attempt.
//! - Everything else is fatal and propagates uncaught.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for pmxlock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock path does not exist (mapped from `io::ErrorKind::NotFound`).
    #[error("lock path '{0}' does not exist")]
    NotFound(PathBuf),

    /// Access to the lock path was denied (mapped from
    /// `io::ErrorKind::PermissionDenied`). On a pmxcfs mount this is how the
    /// server refuses operations on a lock owned by another node.
    #[error("permission denied on lock path '{0}'")]
    PermissionDenied(PathBuf),

    /// The lock name is not usable as a path component.
    #[error("invalid lock name: {0}")]
    InvalidName(String),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid lock configuration: {0}")]
    Config(String),

    /// Any other OS error from `open`, `mkdir`, `flock` or mtime updates.
    #[error("lock I/O failure on '{}': {source}", .path.display())]
    Io {
        /// The lock path the operation targeted.
        path: PathBuf,
        /// The underlying OS error.
        source: io::Error,
    },
}

impl LockError {
    /// Classify an I/O error against the closed cause set.
    ///
    /// `NotFound` and `PermissionDenied` get their own variants because the
    /// recoverable lock's renewal path matches on them; anything else is
    /// wrapped as a fatal `Io` error.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Whether this error leaves lock ownership ambiguous.
    ///
    /// During a renewal attempt, `NotFound` means the lock does not exist and
    /// `PermissionDenied` means another holder owns it. Both mean the caller
    /// must fall back to a full acquire rather than give up.
    pub fn is_ownership_ambiguous(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PermissionDenied(_))
    }
}

/// Result type alias for pmxlock operations.
pub type Result<T> = std::result::Result<T, LockError>;
