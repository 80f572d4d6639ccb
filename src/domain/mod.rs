//! Core entities and repository traits.

pub mod device;
pub mod error;

pub use device::{default_seed, Device, DeviceRepository};
pub use error::{DomainError, DomainResult};
