//! Named cluster locks at the well-known roots.
//!
//! A [`ClusterLock`] pairs a node-local [`Flock`] with a cluster-wide
//! [`RecoverableDirLock`] under one name, acquired through a [`LockChain`]
//! in a fixed order: the file lock first, the directory lock second. The
//! local lock is cheap and keeps two local threads or processes from ever
//! racing each other on the distributed lock — which also satisfies the
//! recoverable lock's precondition that recovery happens under node-local
//! exclusion.

use crate::chain::LockChain;
use crate::config::LockConfig;
use crate::dirlock::{DirLock, RecoverableDirLock};
use crate::error::{LockError, Result};
use crate::flock::Flock;
use crate::lock::Lock;
use crate::timeout::Wait;

/// A named, two-level cluster lock.
pub struct ClusterLock {
    name: String,

    /// Local file lock then recoverable directory lock, in that order.
    chain: LockChain,

    /// Renewal handle for the distributed member. Renewal state lives
    /// entirely in the directory's mtime, so a plain [`DirLock`] on the
    /// same path serves.
    cluster: DirLock,
}

impl ClusterLock {
    /// Create a named cluster lock at the default well-known roots.
    ///
    /// # Returns
    ///
    /// * `Ok(ClusterLock)` - Lock constructed (no OS resource touched yet)
    /// * `Err(LockError::InvalidName)` - Name unusable as a path component
    pub fn new(name: &str) -> Result<Self> {
        Self::with_config(name, &LockConfig::default())
    }

    /// Create a named cluster lock at the roots given by `config`.
    pub fn with_config(name: &str, config: &LockConfig) -> Result<Self> {
        validate_name(name)?;

        let local = Flock::new(config.run_lock_dir.join(name));
        let cluster_path = config.cluster_lock_dir.join(name);
        let chain = LockChain::new(vec![
            Box::new(local),
            Box::new(RecoverableDirLock::new(cluster_path.clone())),
        ]);

        Ok(Self {
            name: name.to_string(),
            chain,
            cluster: DirLock::new(cluster_path),
        })
    }

    /// The lock's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renew the distributed member's ownership window.
    ///
    /// The local file lock has no renewal concept; this passes through to
    /// the directory lock only. Call this at least once per
    /// [`crate::dirlock::SERVER_EXPIRY`] while holding the lock.
    pub fn update(&self) -> Result<()> {
        self.cluster.update()
    }
}

impl Lock for ClusterLock {
    fn try_acquire(&mut self) -> Result<bool> {
        self.chain.try_acquire()
    }

    fn release(&mut self) -> Result<()> {
        self.chain.release()
    }

    fn acquire(&mut self, wait: Wait) -> Result<bool> {
        self.chain.acquire(wait)
    }
}

/// Validate a lock name for use as a single path component.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LockError::InvalidName(
            "lock name must not be empty".to_string(),
        ));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(LockError::InvalidName(format!(
            "lock name '{}' must be a single path component",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A config rooted in a fresh tempdir, with the cluster root created
    /// (it stands in for the pmxcfs mount, which always exists).
    fn test_config(temp_dir: &TempDir) -> LockConfig {
        let config = LockConfig {
            run_lock_dir: temp_dir.path().join("run"),
            cluster_lock_dir: temp_dir.path().join("cluster"),
        };
        std::fs::create_dir_all(&config.cluster_lock_dir).unwrap();
        config
    }

    #[test]
    fn acquire_and_release_leave_both_resources_free() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut lock = ClusterLock::with_config("example", &config).unwrap();
        assert!(lock.acquire(Wait::NoWait).unwrap());
        assert!(config.run_lock_dir.join("example").is_file());
        assert!(config.cluster_lock_dir.join("example").is_dir());

        lock.release().unwrap();
        assert!(!config.cluster_lock_dir.join("example").exists());

        // Both members are free again for a fresh instance.
        let mut second = ClusterLock::with_config("example", &config).unwrap();
        assert!(second.acquire(Wait::NoWait).unwrap());
        second.release().unwrap();
    }

    #[test]
    fn local_contention_stops_before_the_distributed_lock() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut holder = ClusterLock::with_config("migrate", &config).unwrap();
        assert!(holder.acquire(Wait::NoWait).unwrap());

        // The holder's file lock blocks the second instance locally, so the
        // second instance never touches the cluster directory: the holder's
        // directory must survive the failed attempt untouched.
        let mut second = ClusterLock::with_config("migrate", &config).unwrap();
        assert!(!second.acquire(Wait::NoWait).unwrap());
        assert!(config.cluster_lock_dir.join("migrate").is_dir());

        holder.release().unwrap();
    }

    #[test]
    fn update_renews_only_the_distributed_member() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut lock = ClusterLock::with_config("backup", &config).unwrap();
        assert!(lock.acquire(Wait::NoWait).unwrap());

        let dir = config.cluster_lock_dir.join("backup");
        let epoch = filetime::FileTime::zero();
        filetime::set_file_times(&dir, epoch, epoch).unwrap();

        lock.update().unwrap();
        let meta = std::fs::metadata(&dir).unwrap();
        assert!(filetime::FileTime::from_last_modification_time(&meta).unix_seconds() > 0);

        lock.release().unwrap();
    }

    #[test]
    fn guard_releases_the_whole_chain() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut lock = ClusterLock::with_config("example", &config).unwrap();
        {
            let _guard = lock.guard_wait(Wait::NoWait).unwrap().unwrap();
            assert!(config.cluster_lock_dir.join("example").is_dir());
        }
        assert!(!config.cluster_lock_dir.join("example").exists());
    }

    #[test]
    fn names_are_validated() {
        assert!(matches!(
            ClusterLock::new(""),
            Err(LockError::InvalidName(_))
        ));
        assert!(matches!(
            ClusterLock::new("a/b"),
            Err(LockError::InvalidName(_))
        ));
        assert!(matches!(
            ClusterLock::new(".."),
            Err(LockError::InvalidName(_))
        ));
        assert!(ClusterLock::new("vm-100.conf").is_ok());
    }
}
