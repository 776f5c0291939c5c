//! Data model for one collection cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Usage reading for a single mounted partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartitionReading {
    /// Mount point of the partition
    pub path: String,
    /// Total space in bytes
    pub total: u64,
    /// Used space in bytes
    pub used: u64,
    /// Free space in bytes
    pub free: u64,
    /// Usage percentage (0-100) as reported by the probe.
    ///
    /// Probe accounting may include reserved blocks, so this is carried
    /// as-is and never recomputed from the byte fields.
    #[serde(rename = "usagePercent")]
    pub usage_percent: f64,
}

/// One collection cycle's full set of partition readings.
///
/// Immutable once appended to the store. Partition order is discovery
/// order at capture time and is not stable across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    /// Capture instant, second resolution, serialized as a unix timestamp
    #[serde(rename = "timestamp", with = "chrono::serde::ts_seconds")]
    #[schema(value_type = i64)]
    pub captured_at: DateTime<Utc>,
    /// Per-partition readings captured in this cycle
    pub partitions: Vec<PartitionReading>,
}

impl Snapshot {
    pub fn new(captured_at: DateTime<Utc>, partitions: Vec<PartitionReading>) -> Self {
        Self {
            captured_at,
            partitions,
        }
    }

    /// Capture instant as a millisecond epoch, the unit Grafana speaks.
    pub fn captured_at_millis(&self) -> i64 {
        self.captured_at.timestamp() * 1000
    }
}
