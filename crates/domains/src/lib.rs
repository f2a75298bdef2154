//! # domains
//!
//! Core entities, errors and port traits for fruit-health-cloud.
//! Nothing in here performs I/O; adapters implement the ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::*;
pub use models::*;
pub use ports::*;
