//! Application services

mod device;

pub use device::DeviceService;
