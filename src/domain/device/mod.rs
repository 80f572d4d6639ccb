//! Device aggregate
//!
//! Contains the Device entity and its repository interface.

pub mod model;
pub mod repository;

pub use model::{default_seed, Device};
pub use repository::DeviceRepository;
