//! Disk space monitoring subsystem
//!
//! This crate provides the disk usage collector, the bounded in-memory
//! time-series store it feeds, and the HTTP query surface over that data:
//! - live snapshot JSON (fresh collection on demand)
//! - Grafana-style time-series queries by absolute or relative range
//! - Prometheus gauge exposition

pub mod collector;
pub mod gauges;
pub mod probe;
pub mod projection;
pub mod relative;
pub mod routes;
pub mod snapshot;
pub mod store;

pub use collector::{CollectError, DiskMonitor};
pub use gauges::DiskGauges;
pub use probe::{PartitionProbe, ProbeError, SystemProbe};
pub use projection::{project, to_timeseries, DataPoint, SeriesKey, SeriesKind, TimeseriesResponse};
pub use relative::{parse_relative, relative_range, RelativeTimeError};
pub use routes::{configure_routes, MonitoringApiDoc, MonitoringState};
pub use snapshot::{PartitionReading, Snapshot};
pub use store::SeriesStore;
