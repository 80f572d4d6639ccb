//! Device repository interface

use async_trait::async_trait;

use super::model::Device;
use crate::domain::DomainResult;

/// Ordered, append-only device storage.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// All devices in insertion order.
    async fn list(&self) -> DomainResult<Vec<Device>>;
    /// Append one device and return the resulting number of devices.
    async fn append(&self, device: Device) -> DomainResult<usize>;
    async fn count(&self) -> DomainResult<usize>;
}
