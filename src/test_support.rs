//! In-memory lock doubles for exercising the contract and chain logic.

use crate::error::{LockError, Result};
use crate::lock::Lock;
use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

/// Shared event log for observing acquire/release ordering across a chain.
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn new_event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A scriptable in-memory lock.
///
/// Reports busy for a configurable number of attempts, can be made to fail
/// acquisition or release fatally, and records everything it does.
pub(crate) struct TestLock {
    /// Remaining `try_acquire` calls that report busy. `None` means busy
    /// forever.
    busy: Option<u32>,
    fail_acquire: bool,
    fail_release: bool,
    pub(crate) held: bool,
    /// Total `try_acquire` calls.
    pub(crate) attempts: u32,
    pub(crate) acquired_count: u32,
    pub(crate) released_count: u32,
    log: Option<(EventLog, String)>,
}

impl TestLock {
    pub(crate) fn free() -> Self {
        Self::busy_for(0)
    }

    pub(crate) fn busy_for(attempts: u32) -> Self {
        Self {
            busy: Some(attempts),
            fail_acquire: false,
            fail_release: false,
            held: false,
            attempts: 0,
            acquired_count: 0,
            released_count: 0,
            log: None,
        }
    }

    pub(crate) fn always_busy() -> Self {
        Self {
            busy: None,
            ..Self::free()
        }
    }

    pub(crate) fn failing_acquire() -> Self {
        Self {
            fail_acquire: true,
            ..Self::free()
        }
    }

    pub(crate) fn failing_release() -> Self {
        Self {
            fail_release: true,
            ..Self::free()
        }
    }

    pub(crate) fn with_log(mut self, log: &EventLog, name: &str) -> Self {
        self.log = Some((Rc::clone(log), name.to_string()));
        self
    }

    fn record(&self, event: &str) {
        if let Some((log, name)) = &self.log {
            log.borrow_mut().push(format!("{} {}", event, name));
        }
    }
}

impl Lock for TestLock {
    fn try_acquire(&mut self) -> Result<bool> {
        self.attempts += 1;
        if self.fail_acquire {
            return Err(LockError::Io {
                path: PathBuf::from("<test>"),
                source: io::Error::other("scripted acquire failure"),
            });
        }
        match &mut self.busy {
            None => Ok(false),
            Some(0) => {
                self.held = true;
                self.acquired_count += 1;
                self.record("acquire");
                Ok(true)
            }
            Some(n) => {
                *n -= 1;
                Ok(false)
            }
        }
    }

    fn release(&mut self) -> Result<()> {
        if self.fail_release {
            return Err(LockError::Io {
                path: PathBuf::from("<test>"),
                source: io::Error::other("scripted release failure"),
            });
        }
        self.held = false;
        self.released_count += 1;
        self.record("release");
        Ok(())
    }
}
