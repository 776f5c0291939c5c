//! Live Prometheus gauges for the scrape endpoint
//!
//! The collector refreshes these on every successful partition reading;
//! the `/metrics` endpoint only renders the registry and never triggers
//! a collection of its own.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::snapshot::PartitionReading;

/// Gauge set keyed by partition path.
#[derive(Clone)]
pub struct DiskGauges {
    registry: Registry,
    usage_bytes: GaugeVec,
    usage_percent: GaugeVec,
}

impl DiskGauges {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let usage_bytes = GaugeVec::new(
            Opts::new("disk_usage_bytes", "Disk usage in bytes"),
            &["path", "type"],
        )?;
        let usage_percent = GaugeVec::new(
            Opts::new("disk_usage_percent", "Disk usage percentage"),
            &["path"],
        )?;

        registry.register(Box::new(usage_bytes.clone()))?;
        registry.register(Box::new(usage_percent.clone()))?;

        Ok(Self {
            registry,
            usage_bytes,
            usage_percent,
        })
    }

    /// Update all four gauges for one partition reading.
    pub fn record(&self, reading: &PartitionReading) {
        let path = reading.path.as_str();
        self.usage_bytes
            .with_label_values(&[path, "total"])
            .set(reading.total as f64);
        self.usage_bytes
            .with_label_values(&[path, "used"])
            .set(reading.used as f64);
        self.usage_bytes
            .with_label_values(&[path, "free"])
            .set(reading.free as f64);
        self.usage_percent
            .with_label_values(&[path])
            .set(reading.usage_percent);
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("non-utf8 exposition: {e}")))
    }
}
