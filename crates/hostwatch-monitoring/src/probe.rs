//! OS partition discovery and usage probing
//!
//! The collector only sees the [`PartitionProbe`] trait, so tests swap in
//! a scripted probe and the production path stays a thin `sysinfo` shim.

use sysinfo::Disks;
use thiserror::Error;

use crate::snapshot::PartitionReading;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("partition enumeration unavailable: {0}")]
    Unavailable(String),
    #[error("no partition mounted at {0}")]
    NotFound(String),
}

/// Access to the host's mounted partitions and their usage.
pub trait PartitionProbe: Send + Sync {
    /// Enumerate mount points of all currently visible partitions.
    fn partitions(&self) -> Result<Vec<String>, ProbeError>;

    /// Read usage for the partition mounted at `path`.
    fn usage(&self, path: &str) -> Result<PartitionReading, ProbeError>;
}

/// Production probe backed by `sysinfo`.
#[derive(Debug, Default)]
pub struct SystemProbe;

impl SystemProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PartitionProbe for SystemProbe {
    fn partitions(&self) -> Result<Vec<String>, ProbeError> {
        let disks = Disks::new_with_refreshed_list();
        Ok(disks
            .list()
            .iter()
            .map(|disk| disk.mount_point().to_string_lossy().to_string())
            .collect())
    }

    fn usage(&self, path: &str) -> Result<PartitionReading, ProbeError> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point().to_string_lossy() == path)
            .ok_or_else(|| ProbeError::NotFound(path.to_string()))?;

        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        let usage_percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Ok(PartitionReading {
            path: path.to_string(),
            total,
            used,
            free,
            usage_percent,
        })
    }
}
