//! Wait modes and the timeout budget shared by chained acquisitions.
//!
//! A chain of locks acquired under one deadline needs each step to see only
//! the time that is still left. [`TimeoutBudget`] produces those slices: it
//! is an unbounded sequence, consumed once per chain member, that decrements
//! a bounded wait by elapsed wall-clock time and passes the sentinel modes
//! (`NoWait`, `Forever`) through unchanged.

use std::time::{Duration, Instant};

/// How long an acquire operation may wait for a busy lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Attempt once and report busy immediately.
    NoWait,
    /// Block until the lock is acquired.
    Forever,
    /// Block up to the given duration. A zero duration is equivalent to
    /// [`Wait::NoWait`].
    For(Duration),
}

impl Wait {
    /// Convenience constructor for a bounded wait in whole seconds.
    pub fn secs(secs: u64) -> Self {
        Self::For(Duration::from_secs(secs))
    }
}

/// Produces successive "remaining time" slices for chained acquisitions.
///
/// The sequence never terminates: the sentinel modes yield themselves
/// indefinitely, and a bounded wait keeps yielding `Wait::For(0)` once the
/// budget is exhausted. Callers consume only as many slices as they have
/// members.
#[derive(Debug)]
pub struct TimeoutBudget {
    wait: Wait,
    /// Set on the first slice of a bounded wait; elapsed time is measured
    /// from here.
    started: Option<Instant>,
}

impl TimeoutBudget {
    /// Create a budget for the given wait mode.
    pub fn new(wait: Wait) -> Self {
        Self {
            wait,
            started: None,
        }
    }

    /// Yield the next slice of the budget.
    ///
    /// For `NoWait` and `Forever` this is the same mode every time. For a
    /// bounded wait the first call starts the clock and every call returns
    /// the time still left, saturating at zero.
    pub fn slice(&mut self) -> Wait {
        match self.wait {
            Wait::NoWait | Wait::Forever => self.wait,
            Wait::For(total) => {
                let started = *self.started.get_or_insert_with(Instant::now);
                Wait::For(total.saturating_sub(started.elapsed()))
            }
        }
    }
}
