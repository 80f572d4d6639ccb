//! Prometheus metrics registry and runtime collectors

mod registry;
mod runtime;

pub use registry::{DeviceMetrics, MetricsRegistry, CONNECTED_DEVICES, INFO};
pub use runtime::RuntimeCollector;

#[cfg(test)]
pub(crate) use registry::tests::sample;
