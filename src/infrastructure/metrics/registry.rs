//! Per-service Prometheus registry
//!
//! The recorder is never installed globally. Every [`MetricsRegistry`] owns
//! its own `PrometheusRecorder`, so two services in one process (or two tests)
//! never see each other's series. Instruments are registered through
//! [`MetricsRegistry::scoped`], which routes the `metrics` macros to this
//! recorder for the duration of the closure.

use std::sync::Arc;

use metrics::{describe_gauge, gauge, Gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tracing::debug;

use super::runtime::RuntimeCollector;

/// Gauge holding the current number of devices in the store.
pub const CONNECTED_DEVICES: &str = "myapp_connected_devices";
/// Constant gauge (value 1) labeled with the application version.
pub const INFO: &str = "myapp_info";

/// Collection of instruments exposed by one `/metrics` endpoint.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    runtime: Arc<RuntimeCollector>,
    version: Arc<str>,
}

impl MetricsRegistry {
    /// Build a registry with the info gauge and the runtime collectors.
    pub fn new(version: &str) -> Self {
        let recorder = Arc::new(PrometheusBuilder::new().build_recorder());
        let handle = recorder.handle();

        let runtime = metrics::with_local_recorder(&*recorder, || {
            describe_gauge!(INFO, "Information about the My App environment.");
            gauge!(INFO, "version" => version.to_string()).set(1.0);
            RuntimeCollector::register()
        });
        debug!(version, "Metrics registry created");

        Self {
            recorder,
            handle,
            runtime: Arc::new(runtime),
            version: Arc::from(version),
        }
    }

    /// Run `f` with this registry as the active `metrics` recorder.
    ///
    /// Handles created inside the closure (`gauge!`, `counter!`, ...) stay
    /// bound to this registry after it returns.
    pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&*self.recorder, f)
    }

    /// Register the device-count gauge.
    pub fn device_metrics(&self) -> DeviceMetrics {
        let connected_devices = self.scoped(|| {
            describe_gauge!(CONNECTED_DEVICES, "Number of currently connected devices.");
            gauge!(CONNECTED_DEVICES)
        });
        DeviceMetrics { connected_devices }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Refresh the runtime collectors and render the text exposition format.
    pub fn render(&self) -> String {
        self.runtime.refresh();
        self.handle.run_upkeep();
        self.handle.render()
    }
}

/// Instruments describing the device store.
#[derive(Clone)]
pub struct DeviceMetrics {
    connected_devices: Gauge,
}

impl DeviceMetrics {
    pub fn set_connected(&self, count: usize) {
        self.connected_devices.set(count as f64);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Value of the first sample whose series (name plus labels) equals `series`.
    pub(crate) fn sample(rendered: &str, series: &str) -> Option<f64> {
        rendered
            .lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| {
                let (name, value) = line.rsplit_once(' ')?;
                (name == series).then(|| value.parse().ok()).flatten()
            })
    }

    #[test]
    fn info_gauge_is_exported_once_with_version_label() {
        let registry = MetricsRegistry::new("2.10.5");
        let rendered = registry.render();

        let series = r#"myapp_info{version="2.10.5"}"#;
        assert_eq!(sample(&rendered, series), Some(1.0));
        assert_eq!(
            rendered.lines().filter(|l| l.starts_with("myapp_info{")).count(),
            1
        );
        assert!(rendered.contains("# HELP myapp_info Information about the My App environment."));
    }

    #[test]
    fn device_gauge_follows_updates() {
        let registry = MetricsRegistry::new("1.0.0");
        let devices = registry.device_metrics();

        devices.set_connected(2);
        assert_eq!(sample(&registry.render(), CONNECTED_DEVICES), Some(2.0));

        devices.set_connected(5);
        assert_eq!(sample(&registry.render(), CONNECTED_DEVICES), Some(5.0));
    }

    #[test]
    fn registries_are_isolated() {
        let first = MetricsRegistry::new("1.0.0");
        let second = MetricsRegistry::new("2.0.0");
        first.device_metrics().set_connected(9);

        let rendered = second.render();
        assert_eq!(sample(&rendered, CONNECTED_DEVICES), None);
        assert!(!rendered.contains(r#"version="1.0.0""#));
    }

    #[test]
    fn runtime_collectors_are_rendered() {
        let registry = MetricsRegistry::new("1.0.0");
        let rendered = registry.render();
        assert!(rendered.contains("process_start_time_seconds"));
        assert!(rendered.contains("process_uptime_seconds"));
    }
}
