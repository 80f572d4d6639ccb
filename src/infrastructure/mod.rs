//! Infrastructure layer - external concerns

pub mod metrics;
pub mod storage;

pub use self::metrics::{DeviceMetrics, MetricsRegistry};
pub use storage::InMemoryDeviceRepository;
