//! In-memory storage implementation

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Device, DeviceRepository, DomainResult};

/// In-memory device storage.
///
/// Readers share the lock; an append holds it exclusively, so the length
/// returned by [`DeviceRepository::append`] always includes the new device.
pub struct InMemoryDeviceRepository {
    devices: RwLock<Vec<Device>>,
}

impl InMemoryDeviceRepository {
    /// Create a repository pre-populated with `seed`, in order.
    pub fn new(seed: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(seed),
        }
    }
}

impl Default for InMemoryDeviceRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn list(&self) -> DomainResult<Vec<Device>> {
        Ok(self.devices.read().await.clone())
    }

    async fn append(&self, device: Device) -> DomainResult<usize> {
        let mut devices = self.devices.write().await;
        devices.push(device);
        Ok(devices.len())
    }

    async fn count(&self) -> DomainResult<usize> {
        Ok(self.devices.read().await.len())
    }
}
