//! Configuration for the pmxlock lock roots.
//!
//! This module defines the [`LockConfig`] struct naming the two well-known
//! base directories the cluster lock protocol uses. It supports
//! forward-compatible YAML parsing (unknown fields are ignored), sensible
//! defaults for optional fields, and validation of config values.
//!
//! The defaults must stay bit-for-bit compatible with the existing cluster
//! protocol: every node derives the same lock paths from the same roots.

use crate::error::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory for node-local lock files (tmpfs, per boot).
pub const DEFAULT_RUN_LOCK_DIR: &str = "/run/lock/pmxlock";

/// Default directory for cluster-wide lock directories (pmxcfs mount).
pub const DEFAULT_CLUSTER_LOCK_DIR: &str = "/etc/pve/priv/lock";

/// Configuration for lock path resolution.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Directory holding the node-local `flock(2)` files.
    #[serde(default = "default_run_lock_dir")]
    pub run_lock_dir: PathBuf,

    /// Directory holding the cluster-wide lock directories. Must be a path
    /// on the replicated cluster filesystem for cross-node exclusion.
    #[serde(default = "default_cluster_lock_dir")]
    pub cluster_lock_dir: PathBuf,
}

// Default value functions for serde
fn default_run_lock_dir() -> PathBuf {
    PathBuf::from(DEFAULT_RUN_LOCK_DIR)
}
fn default_cluster_lock_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CLUSTER_LOCK_DIR)
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            run_lock_dir: default_run_lock_dir(),
            cluster_lock_dir: default_cluster_lock_dir(),
        }
    }
}

impl LockConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward
    /// compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config YAML file
    ///
    /// # Returns
    ///
    /// * `Ok(LockConfig)` - Successfully loaded and validated config
    /// * `Err(LockError::Config)` - Read, parse or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            LockError::Config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Both lock roots must be non-empty absolute paths; relative roots would
    /// make lock identity depend on the process working directory.
    pub fn validate(&self) -> Result<()> {
        for (label, dir) in [
            ("run_lock_dir", &self.run_lock_dir),
            ("cluster_lock_dir", &self.cluster_lock_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(LockError::Config(format!("{} must not be empty", label)));
            }
            if !dir.is_absolute() {
                return Err(LockError::Config(format!(
                    "{} must be an absolute path, got '{}'",
                    label,
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_wire_compatible_roots() {
        let config = LockConfig::default();
        assert_eq!(config.run_lock_dir, Path::new("/run/lock/pmxlock"));
        assert_eq!(config.cluster_lock_dir, Path::new("/etc/pve/priv/lock"));
        config.validate().unwrap();
    }

    #[test]
    fn load_applies_defaults_for_missing_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "run_lock_dir: /tmp/locks\n").unwrap();

        let config = LockConfig::load(&path).unwrap();
        assert_eq!(config.run_lock_dir, Path::new("/tmp/locks"));
        assert_eq!(config.cluster_lock_dir, Path::new("/etc/pve/priv/lock"));
    }

    #[test]
    fn load_ignores_unknown_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "cluster_lock_dir: /mnt/pve/lock\nfuture_knob: 42\n",
        )
        .unwrap();

        let config = LockConfig::load(&path).unwrap();
        assert_eq!(config.cluster_lock_dir, Path::new("/mnt/pve/lock"));
    }

    #[test]
    fn load_rejects_relative_roots() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "run_lock_dir: relative/locks\n").unwrap();

        let err = LockConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = LockConfig::load("/nonexistent/config.yaml").unwrap_err();
        assert!(matches!(err, LockError::Config(_)));
    }
}
