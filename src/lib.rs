//! # Device Registry
//!
//! In-memory registry of hardware devices with a Prometheus metrics endpoint.
//!
//! ## Architecture
//!
//! - **domain**: Device entity, repository trait, domain errors
//! - **application**: Device service (the single writer of the store)
//! - **infrastructure**: In-memory storage, Prometheus registry and runtime collectors
//! - **interfaces**: HTTP handlers, middleware and routers
//! - **server**: Listener lifecycle and graceful shutdown
//! - **config**: TOML configuration

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig, ListenerLayout};
pub use domain::Device;
pub use server::{init_tracing, ServerHandle, ServerOptions};
