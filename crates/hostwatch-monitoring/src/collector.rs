//! Background disk usage collection
//!
//! One `DiskMonitor` owns the probe, the shared series store and the
//! live gauges. A single background task appends snapshots on a fixed
//! cadence while request handlers read concurrently through the store
//! lock; a failed cycle is logged and the next one runs on schedule.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hostwatch_core::MonitorSettings;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::gauges::DiskGauges;
use crate::probe::{PartitionProbe, ProbeError};
use crate::snapshot::Snapshot;
use crate::store::SeriesStore;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("partition enumeration failed: {0}")]
    Enumeration(#[source] ProbeError),
    #[error("gauge registry error: {0}")]
    Gauges(#[from] prometheus::Error),
}

/// Disk usage monitor service.
pub struct DiskMonitor {
    probe: Arc<dyn PartitionProbe>,
    store: RwLock<SeriesStore>,
    gauges: DiskGauges,
    interval: Duration,
}

impl DiskMonitor {
    /// Create a monitor with an empty store sized from the settings.
    pub fn new(
        probe: Arc<dyn PartitionProbe>,
        settings: &MonitorSettings,
    ) -> Result<Self, CollectError> {
        Ok(Self {
            probe,
            store: RwLock::new(SeriesStore::with_capacity(settings.store_capacity())),
            gauges: DiskGauges::new()?,
            interval: settings.collect_interval,
        })
    }

    /// Run one collection cycle.
    ///
    /// A partition whose usage probe fails is logged and skipped, so a
    /// partial snapshot is still valid and stored. An enumeration
    /// failure aborts the cycle without touching the store.
    pub async fn collect_once(&self) -> Result<Snapshot, CollectError> {
        let paths = self
            .probe
            .partitions()
            .map_err(CollectError::Enumeration)?;

        let mut readings = Vec::with_capacity(paths.len());
        for path in paths {
            match self.probe.usage(&path) {
                Ok(reading) => {
                    self.gauges.record(&reading);
                    readings.push(reading);
                }
                Err(e) => {
                    warn!("skipping partition {}: {}", path, e);
                }
            }
        }

        let snapshot = Snapshot::new(Utc::now(), readings);
        self.store.write().await.append(snapshot.clone());
        Ok(snapshot)
    }

    /// Snapshots with capture time in `[from, to]` inclusive.
    pub async fn range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Snapshot> {
        self.store.read().await.range(from, to)
    }

    /// Number of snapshots currently held.
    pub async fn stored_snapshots(&self) -> usize {
        self.store.read().await.len()
    }

    /// Prometheus text exposition of the live gauges.
    pub fn render_gauges(&self) -> Result<String, prometheus::Error> {
        self.gauges.render()
    }

    /// Run the collection loop forever.
    ///
    /// Each cycle is independent; failures never terminate the loop.
    pub async fn start_monitoring(self: Arc<Self>) {
        info!(
            "Starting disk usage collection every {:?}",
            self.interval
        );

        loop {
            match self.collect_once().await {
                Ok(snapshot) => {
                    debug!(
                        "Collection cycle stored {} partition reading(s)",
                        snapshot.partitions.len()
                    );
                }
                Err(e) => {
                    error!("Collection cycle failed: {}", e);
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
