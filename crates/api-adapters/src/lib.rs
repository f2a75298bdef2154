//! # api-adapters
//!
//! The HTTP surface of fruit-health-cloud. With feature `web-axum` this
//! crate provides the axum router, request extractors, DTOs and error
//! mapping; `dto` and `metrics` are framework-agnostic.

pub mod dto;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod web;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use web::{router, AppState};
