//! Query-time projection of snapshots into named series
//!
//! Each partition contributes three independent series (used bytes, free
//! bytes, usage percent). Series are keyed by a typed [`SeriesKey`]
//! internally and only rendered to their display string at the
//! serialization boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::snapshot::Snapshot;

/// Which partition metric a series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKind {
    Used,
    Free,
    UsagePercent,
}

impl SeriesKind {
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Used => "Used",
            SeriesKind::Free => "Free",
            SeriesKind::UsagePercent => "Usage %",
        }
    }
}

/// Identity of one derived series: a partition path plus a metric kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub path: String,
    pub kind: SeriesKind,
}

impl SeriesKey {
    pub fn new(path: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.path, self.kind.label())
    }
}

/// One (value, millisecond timestamp) point of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub value: f64,
    pub timestamp_ms: i64,
}

/// Group snapshots into per-series point lists, ascending by timestamp.
///
/// `path_filter` is an exact mount-point match; a filter matching no
/// partition yields an empty mapping, as does an empty snapshot slice.
/// The sort is stable, so points with equal timestamps stay in snapshot
/// ingestion order.
pub fn project(
    snapshots: &[Snapshot],
    path_filter: Option<&str>,
) -> BTreeMap<SeriesKey, Vec<DataPoint>> {
    let mut series: BTreeMap<SeriesKey, Vec<DataPoint>> = BTreeMap::new();

    for snapshot in snapshots {
        let timestamp_ms = snapshot.captured_at_millis();

        for partition in &snapshot.partitions {
            if let Some(filter) = path_filter {
                if partition.path != filter {
                    continue;
                }
            }

            let points = [
                (SeriesKind::Used, partition.used as f64),
                (SeriesKind::Free, partition.free as f64),
                (SeriesKind::UsagePercent, partition.usage_percent),
            ];
            for (kind, value) in points {
                series
                    .entry(SeriesKey::new(partition.path.clone(), kind))
                    .or_default()
                    .push(DataPoint {
                        value,
                        timestamp_ms,
                    });
            }
        }
    }

    for points in series.values_mut() {
        points.sort_by_key(|p| p.timestamp_ms);
    }

    series
}

/// Grafana JSON datasource response entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeseriesResponse {
    /// Display name of the series, e.g. `/ - Used`
    pub target: String,
    /// `[value, timestampMillis]` pairs, ascending by timestamp
    #[schema(value_type = Vec<Vec<f64>>)]
    pub datapoints: Vec<[f64; 2]>,
}

/// Render a projection into the dashboard response shape.
///
/// The `BTreeMap` ordering makes the output deterministic (sorted by
/// path, then metric kind) within one response.
pub fn to_timeseries(series: BTreeMap<SeriesKey, Vec<DataPoint>>) -> Vec<TimeseriesResponse> {
    series
        .into_iter()
        .map(|(key, points)| TimeseriesResponse {
            target: key.to_string(),
            datapoints: points
                .into_iter()
                .map(|p| [p.value, p.timestamp_ms as f64])
                .collect(),
        })
        .collect()
}
