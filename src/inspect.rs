//! Inspection of the cluster lock directory.
//!
//! Enumerates the lock directories under the cluster lock root and reports
//! who is plausibly holding what. This is observational only: the listing
//! is stale the moment it returns and must never gate an acquire.

use crate::config::LockConfig;
use crate::dirlock::SERVER_EXPIRY;
use crate::error::{LockError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Information about one cluster lock directory.
#[derive(Debug, Clone, Serialize)]
pub struct LockInfo {
    /// The lock name (the directory's file name).
    pub name: String,

    /// The lock directory path.
    pub path: PathBuf,

    /// Last renewal time (the directory's mtime). Epoch zero when an
    /// unlock request is pending.
    pub modified: DateTime<Utc>,

    /// Whether the holder has failed to renew within the server's expiry
    /// window, making the lock reclaimable.
    pub expired: bool,
}

impl LockInfo {
    /// Time since the last renewal.
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.modified)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds)
        }
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (age: {}{})",
            self.name,
            self.age_string(),
            if self.expired { ", EXPIRED" } else { "" }
        )
    }
}

/// List all lock directories under the cluster lock root.
///
/// Entries that are not directories or whose metadata cannot be read are
/// skipped. An absent root yields an empty list.
///
/// # Returns
///
/// A vector of [`LockInfo`], sorted by name for consistent output.
pub fn list_locks(config: &LockConfig) -> Result<Vec<LockInfo>> {
    let root = &config.cluster_lock_dir;
    let mut locks = Vec::new();

    if !root.exists() {
        return Ok(locks);
    }

    let entries = fs::read_dir(root).map_err(|e| LockError::from_io(root, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| LockError::from_io(root, e))?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // Only directories are locks; skip entries that vanish or cannot
        // be read mid-listing.
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        let expired = modified
            .elapsed()
            .map(|age| age > SERVER_EXPIRY)
            .unwrap_or(false);

        locks.push(LockInfo {
            name: name.to_string(),
            path: path.clone(),
            modified: DateTime::<Utc>::from(modified),
            expired,
        });
    }

    locks.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(locks)
}
