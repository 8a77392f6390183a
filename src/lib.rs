//! Cluster-coordination mutual-exclusion primitives for pmxcfs-backed hosts.
//!
//! Two OS-level mechanisms provide the exclusion:
//!
//! - [`Flock`]: a node-local advisory lock on a regular file via `flock(2)`.
//! - [`DirLock`]: a cluster-wide lock relying on the cluster filesystem's
//!   atomic directory creation, with the mtime-based expiry-request and
//!   renewal signals the pmxcfs server understands.
//!
//! [`RecoverableDirLock`] lets a restarted process resume ownership of a
//! still-live directory lock instead of waiting out the server's expiry
//! window, [`LockChain`] composes locks all-or-nothing with rollback, and
//! [`ClusterLock`] is the named pairing of a local file lock with a
//! recoverable directory lock at the well-known roots.
//!
//! # Example
//!
//! ```no_run
//! use pmxlock::{ClusterLock, Lock};
//!
//! fn migrate() -> pmxlock::Result<()> {
//!     let mut lock = ClusterLock::new("storage-migrate")?;
//!     let guard = lock.guard()?;
//!     // Exclusive across every node in the cluster. Long critical
//!     // sections must renew with ClusterLock::update().
//!     guard.release()?;
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency model
//!
//! Classic blocking threads: waits either use a native blocking syscall or
//! a fixed-interval polling loop. Lock instances carry no internal
//! synchronization; callers serialize access to a given instance.

pub mod chain;
pub mod cluster;
pub mod config;
pub mod dirlock;
pub mod error;
pub mod flock;
pub mod inspect;
pub mod lock;
pub mod timeout;

#[cfg(test)]
mod test_support;

pub use chain::LockChain;
pub use cluster::ClusterLock;
pub use config::{DEFAULT_CLUSTER_LOCK_DIR, DEFAULT_RUN_LOCK_DIR, LockConfig};
pub use dirlock::{DirLock, RecoverableDirLock, SERVER_EXPIRY};
pub use error::{LockError, Result};
pub use flock::Flock;
pub use inspect::{LockInfo, list_locks};
pub use lock::{Guard, Lock, POLL_INTERVAL};
pub use timeout::{TimeoutBudget, Wait};
