//! All-or-nothing composition of multiple locks.
//!
//! A [`LockChain`] acquires its members in a fixed order under one shared
//! timeout budget. Either every member ends up held, or the chain rolls
//! back everything it had acquired before surfacing the member's outcome —
//! a partial acquisition is never left behind, whether the member reported
//! busy or failed outright.

use crate::error::Result;
use crate::lock::Lock;
use crate::timeout::{TimeoutBudget, Wait};

/// An ordered, all-or-nothing composition of locks.
pub struct LockChain {
    members: Vec<Box<dyn Lock>>,

    /// Number of leading members currently held. Grows monotonically during
    /// an acquire attempt and is drained in reverse on release or rollback.
    held: usize,
}

impl LockChain {
    /// Create a chain over the given members, acquired in the given order.
    pub fn new(members: Vec<Box<dyn Lock>>) -> Self {
        Self { members, held: 0 }
    }

    /// Number of member locks.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the chain has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Release every held member in reverse acquisition order, best-effort.
    ///
    /// A member release that fails here must not mask the acquisition
    /// outcome the caller is about to see, so failures are reported as
    /// warnings and unwinding continues.
    fn rollback(&mut self) {
        while self.held > 0 {
            self.held -= 1;
            if let Err(e) = self.members[self.held].release() {
                eprintln!("Warning: failed to release lock during rollback: {}", e);
            }
        }
    }
}

impl Lock for LockChain {
    fn try_acquire(&mut self) -> Result<bool> {
        self.acquire(Wait::NoWait)
    }

    /// Release all held members in reverse acquisition order.
    ///
    /// Stops at the first failing member; that member and the ones acquired
    /// before it stay held, and none of them will be double-released by a
    /// retry.
    fn release(&mut self) -> Result<()> {
        while self.held > 0 {
            self.held -= 1;
            self.members[self.held].release()?;
        }
        Ok(())
    }

    /// Acquire every member in order, splitting `wait` across them.
    ///
    /// Each member consumes the next slice of the shared budget. The first
    /// member that reports busy or fails triggers a reverse-order rollback
    /// of everything acquired so far, and the chain returns that member's
    /// outcome unchanged.
    fn acquire(&mut self, wait: Wait) -> Result<bool> {
        let mut budget = TimeoutBudget::new(wait);
        for index in 0..self.members.len() {
            match self.members[index].acquire(budget.slice()) {
                Ok(true) => self.held = index + 1,
                Ok(false) => {
                    self.rollback();
                    return Ok(false);
                }
                Err(e) => {
                    self.rollback();
                    return Err(e);
                }
            }
        }
        Ok(true)
    }
}
