//! HTTP interfaces
//!
//! - `common`: shared extractors
//! - `error`: API error type and its HTTP mapping
//! - `modules`: request handlers and middleware per resource
//! - `router`: listener routers for the split and single layouts

pub mod common;
pub mod error;
pub mod modules;
pub mod router;

pub use error::ApiError;
pub use router::{devices_router, metrics_router, single_router, AppState};
