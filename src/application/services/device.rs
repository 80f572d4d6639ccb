//! Device registry business logic service

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{Device, DeviceRepository, DomainResult};
use crate::infrastructure::DeviceMetrics;

/// Service for device registry operations.
///
/// The only writer of the repository. Appends are serialized so the
/// device-count gauge is always set to the length produced by the latest append.
pub struct DeviceService {
    repository: Arc<dyn DeviceRepository>,
    metrics: DeviceMetrics,
    write_lock: Mutex<()>,
}

impl DeviceService {
    /// Wrap `repository` and publish its current size to `metrics`.
    pub async fn new(
        repository: Arc<dyn DeviceRepository>,
        metrics: DeviceMetrics,
    ) -> DomainResult<Self> {
        let count = repository.count().await?;
        metrics.set_connected(count);
        info!("Device registry initialized with {} devices", count);

        Ok(Self {
            repository,
            metrics,
            write_lock: Mutex::new(()),
        })
    }

    /// All devices in insertion order.
    pub async fn list(&self) -> DomainResult<Vec<Device>> {
        self.repository.list().await
    }

    /// Append a device and update the device-count gauge.
    pub async fn register(&self, device: Device) -> DomainResult<usize> {
        let _guard = self.write_lock.lock().await;

        let id = device.id;
        let count = self.repository.append(device).await?;
        self.metrics.set_connected(count);

        info!(device_id = id, total = count, "Device registered");
        Ok(count)
    }

    pub async fn count(&self) -> DomainResult<usize> {
        self.repository.count().await
    }
}
