//! `/devices` endpoint

pub mod handlers;

pub use handlers::*;
