//! Cluster-wide locks over pmxcfs directory creation.
//!
//! The replicated cluster filesystem guarantees that `mkdir` succeeds for
//! exactly one contender, which makes a directory's mere existence a
//! cluster-wide "held" signal. Two mtime conventions complete the protocol:
//!
//! - mtime set to epoch zero asks the server to reap the lock if its holder
//!   has not renewed within the server's fixed expiry window;
//! - mtime set to "now" renews the holder's ownership window.
//!
//! The server enforces the expiry window on its own; a holder that intends
//! to keep a lock longer than [`SERVER_EXPIRY`] must call
//! [`DirLock::update`] periodically.

use crate::error::{LockError, Result};
use crate::lock::Lock;
use crate::timeout::Wait;
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The server-side lock expiry window enforced by pmxcfs.
///
/// Not configurable by clients; a lock whose directory mtime is older than
/// this is reclaimable by other nodes.
pub const SERVER_EXPIRY: Duration = Duration::from_secs(120);

/// A cluster-wide lock backed by atomic directory creation.
///
/// Holds no in-memory state beyond the path: "held" is exactly "the
/// directory exists", recovered from the filesystem on every operation.
#[derive(Debug, Clone)]
pub struct DirLock {
    /// Path of the lock directory on the cluster filesystem.
    path: PathBuf,
}

impl DirLock {
    /// Create a lock for the given directory path. No OS resource is
    /// touched until the first acquire.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the lock directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the server to reap the lock if its holder let it expire.
    ///
    /// Sets the lock directory's timestamps to epoch zero. This is a
    /// best-effort signal: a missing directory (nothing to reap) and a
    /// permission refusal (the server protecting a live holder) are both
    /// ignored. Any other failure indicates an unhealthy cluster filesystem
    /// and propagates.
    pub fn request_unlock(&self) -> Result<()> {
        let epoch = FileTime::zero();
        match filetime::set_file_times(&self.path, epoch, epoch) {
            Ok(()) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                Ok(())
            }
            Err(e) => Err(LockError::from_io(&self.path, e)),
        }
    }

    /// Renew ownership without releasing.
    ///
    /// Sets the lock directory's timestamps to "now", restarting the
    /// server's expiry window. Fails with [`LockError::NotFound`] when the
    /// lock does not exist and [`LockError::PermissionDenied`] when another
    /// holder owns it; the recoverable variant uses exactly those two
    /// outcomes as its fallback signal.
    pub fn update(&self) -> Result<()> {
        let now = FileTime::now();
        filetime::set_file_times(&self.path, now, now)
            .map_err(|e| LockError::from_io(&self.path, e))
    }
}

impl Lock for DirLock {
    fn try_acquire(&mut self) -> Result<bool> {
        // Give the server a chance to reap an expired holder before we
        // compete for the directory.
        self.request_unlock()?;
        match fs::create_dir(&self.path) {
            Ok(()) => Ok(true),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(LockError::from_io(&self.path, e)),
        }
    }

    fn release(&mut self) -> Result<()> {
        fs::remove_dir(&self.path).map_err(|e| LockError::from_io(&self.path, e))
    }
}

/// A [`DirLock`] that first tries to resume ownership it may already hold.
///
/// A restarted process (or a second cooperating process on the same node)
/// can be the de facto owner of a not-yet-expired lock. A plain re-acquire
/// would stall until the server's expiry window passes; this variant renews
/// optimistically and only competes for the directory when the renewal says
/// the lock is missing or owned elsewhere.
///
/// # Precondition
///
/// Hold a node-local lock (for example [`crate::Flock`]) around the
/// recovery path: renewal bypasses the normal mutual-exclusion race, so
/// something else must keep two local processes from both "recovering" the
/// same lock.
#[derive(Debug, Clone)]
pub struct RecoverableDirLock {
    inner: DirLock,
}

impl RecoverableDirLock {
    /// Create a recoverable lock for the given directory path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            inner: DirLock::new(path),
        }
    }

    /// Path of the lock directory.
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Renew ownership without releasing. See [`DirLock::update`].
    pub fn update(&self) -> Result<()> {
        self.inner.update()
    }
}

impl Lock for RecoverableDirLock {
    fn try_acquire(&mut self) -> Result<bool> {
        self.inner.try_acquire()
    }

    fn release(&mut self) -> Result<()> {
        self.inner.release()
    }

    /// Renew-first acquire.
    ///
    /// A successful renewal means we already own the lock and acquisition is
    /// complete. An ownership-ambiguous failure falls back to the full
    /// acquire under the caller's wait mode; any other failure is fatal.
    fn acquire(&mut self, wait: Wait) -> Result<bool> {
        match self.inner.update() {
            Ok(()) => Ok(true),
            Err(e) if e.is_ownership_ambiguous() => self.inner.acquire(wait),
            Err(e) => Err(e),
        }
    }
}
