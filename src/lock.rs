//! The mutual-exclusion contract shared by all lock types.
//!
//! A concrete lock only has to provide two primitives: a single non-waiting
//! acquisition attempt and a release. Every other acquire mode has a default
//! implementation built from those, and concrete types may override a
//! default when the OS offers something better (the file lock substitutes a
//! native blocking `flock` for the polling loop).
//!
//! # Scoped acquisition
//!
//! [`Lock::guard`] acquires the lock and returns an RAII [`Guard`] that
//! releases it when dropped, on both normal and unwinding exits. If the
//! release fails during drop, a warning is printed but no panic occurs.

use crate::error::Result;
use crate::timeout::Wait;
use std::thread;
use std::time::{Duration, Instant};

/// Interval between attempts in the default polling loops.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A mutual-exclusion lock over some OS resource.
///
/// Implementations are not internally synchronized: concurrent calls on one
/// instance from multiple threads must be serialized by the caller. Reuse
/// after release (acquire again) is supported.
pub trait Lock {
    /// Attempt a single, non-waiting acquisition.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Lock acquired
    /// * `Ok(false)` - Lock is held by someone else (never an error)
    /// * `Err(...)` - Unrecoverable OS failure unrelated to contention
    fn try_acquire(&mut self) -> Result<bool>;

    /// Release the lock.
    ///
    /// Must be safe to call exactly once per successful acquire.
    fn release(&mut self) -> Result<()>;

    /// Block until the lock is acquired, polling at [`POLL_INTERVAL`].
    ///
    /// Once this wait has begun it cannot be aborted except by an OS-level
    /// interruption; use [`Lock::acquire_timeout`] for a bounded wait.
    fn acquire_blocking(&mut self) -> Result<bool> {
        loop {
            if self.try_acquire()? {
                return Ok(true);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Block until the lock is acquired or the deadline elapses.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Lock acquired within the deadline
    /// * `Ok(false)` - Deadline elapsed first
    fn acquire_timeout(&mut self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.try_acquire()? {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Acquire the lock with the given wait mode.
    ///
    /// `Wait::For` with a zero duration is dispatched as a non-waiting
    /// attempt, so an exhausted timeout budget degrades to "try once".
    fn acquire(&mut self, wait: Wait) -> Result<bool> {
        match wait {
            Wait::NoWait => self.try_acquire(),
            Wait::Forever => self.acquire_blocking(),
            Wait::For(d) if d.is_zero() => self.try_acquire(),
            Wait::For(d) => self.acquire_timeout(d),
        }
    }

    /// Probe whether someone else currently holds the lock.
    ///
    /// Performs a non-waiting acquire; on success the lock is immediately
    /// released and `false` is returned. This is a side-effecting probe and
    /// must not be used as a precondition for a separate acquire (the answer
    /// is stale the moment it returns).
    fn locked(&mut self) -> Result<bool> {
        if self.try_acquire()? {
            self.release()?;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    /// Acquire the lock (blocking) and return an RAII guard for it.
    fn guard(&mut self) -> Result<Guard<'_, Self>>
    where
        Self: Sized,
    {
        // A Forever wait only returns once the lock is held.
        self.acquire(Wait::Forever)?;
        Ok(Guard::new(self))
    }

    /// Acquire the lock with the given wait mode and return an RAII guard.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(guard))` - Lock acquired
    /// * `Ok(None)` - Lock was busy for the whole wait
    fn guard_wait(&mut self, wait: Wait) -> Result<Option<Guard<'_, Self>>>
    where
        Self: Sized,
    {
        if self.acquire(wait)? {
            Ok(Some(Guard::new(self)))
        } else {
            Ok(None)
        }
    }
}

/// RAII guard for an acquired lock.
///
/// When dropped, the lock is released. If the release fails, a warning is
/// printed but no panic occurs; call [`Guard::release`] to handle the error
/// explicitly.
pub struct Guard<'a, L: Lock> {
    lock: &'a mut L,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, L: Lock> Guard<'a, L> {
    fn new(lock: &'a mut L) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release before the guard goes out of
    /// scope and handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl<L: Lock> Drop for Guard<'_, L> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release()
        {
            eprintln!("Warning: failed to release lock: {}", e);
        }
    }
}
