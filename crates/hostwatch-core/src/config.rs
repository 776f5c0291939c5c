//! Configuration for the monitoring subsystem

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the disk collector and its in-memory history.
///
/// The series store capacity is derived from these values rather than
/// configured directly: one snapshot is kept per collection cycle across
/// the retention horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// How often the collector samples partition usage
    pub collect_interval: Duration,
    /// How far back the in-memory history reaches
    pub retention: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            collect_interval: Duration::from_secs(60),
            retention: Duration::from_secs(60 * 60 * 24),
        }
    }
}

impl MonitorSettings {
    pub fn new(collect_interval: Duration, retention: Duration) -> Self {
        Self {
            collect_interval,
            retention,
        }
    }

    /// Maximum number of snapshots the series store holds.
    ///
    /// Floor of retention / interval, never below 1 so the store can
    /// always hold the most recent snapshot.
    pub fn store_capacity(&self) -> usize {
        let interval = self.collect_interval.as_secs().max(1);
        let slots = self.retention.as_secs() / interval;
        (slots as usize).max(1)
    }
}
