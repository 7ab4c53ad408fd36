//! Telemetry sink handed to the interpreter at construction.

use tracing::info;

/// Receives usage events (an action ran, a report was published).
pub trait Collector: Send + Sync {
    fn collect(&self, event: &str, properties: &[(&str, &str)]);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCollector;

impl Collector for NoopCollector {
    fn collect(&self, _event: &str, _properties: &[(&str, &str)]) {}
}

/// Forwards events to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCollector;

impl Collector for TracingCollector {
    fn collect(&self, event: &str, properties: &[(&str, &str)]) {
        info!(event, ?properties, "telemetry");
    }
}
