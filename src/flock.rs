//! Node-local advisory file lock over `flock(2)`.
//!
//! The lock file is opened (or created) read/write and locked exclusively
//! via fs2. The descriptor is recorded as locked only once a lock request
//! actually succeeds; every failure path closes the just-opened descriptor
//! so nothing leaks.
//!
//! # Open file descriptions
//!
//! `flock(2)` locks belong to the *open file description*, not the owning
//! process: two independent opens of the same path by the same process do
//! not share lock state (so two `Flock` instances exclude each other even
//! in-process), but a duplicated descriptor does.

use crate::error::{LockError, Result};
use crate::lock::Lock;
use fs2::FileExt as _;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// An advisory lock on a regular file.
///
/// The file is zero-length and persists after release; only the `flock`
/// state conveys ownership.
#[derive(Debug)]
pub struct Flock {
    /// Path of the lock file.
    path: PathBuf,

    /// The descriptor holding the lock, retained only once a lock request
    /// succeeded. Guards against releasing a descriptor that was opened but
    /// never actually locked.
    locked: Option<File>,
}

impl Flock {
    /// Create a lock for the given file path. No OS resource is touched
    /// until the first acquire.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            locked: None,
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open or create the lock file.
    ///
    /// The file is never truncated: a waiting process must not disturb a
    /// held lock file. The parent directory is created if missing (the
    /// runtime lock root lives on tmpfs and starts empty on every boot).
    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| LockError::from_io(parent, e))?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| LockError::from_io(&self.path, e))
    }
}

/// Whether an fs2 locking error means "held by someone else".
fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Lock for Flock {
    fn try_acquire(&mut self) -> Result<bool> {
        let file = self.open()?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                self.locked = Some(file);
                Ok(true)
            }
            // The descriptor is closed when `file` drops on both paths below.
            Err(e) if is_contended(&e) => Ok(false),
            Err(e) => Err(LockError::from_io(&self.path, e)),
        }
    }

    fn release(&mut self) -> Result<()> {
        // Closing the descriptor releases the advisory lock. Releasing when
        // not held is a no-op.
        self.locked.take();
        Ok(())
    }

    /// Native blocking acquire.
    ///
    /// Overrides the polling default with a blocking `flock` request, which
    /// wakes immediately when the holder releases instead of at the next
    /// poll.
    fn acquire_blocking(&mut self) -> Result<bool> {
        let file = self.open()?;
        file.lock_exclusive()
            .map_err(|e| LockError::from_io(&self.path, e))?;
        self.locked = Some(file);
        Ok(true)
    }
}
