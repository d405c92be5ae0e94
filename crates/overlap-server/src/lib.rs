//! # overlap-server
//!
//! HTTP API for the Overlap PSI audience-measurement service. The
//! request pipeline itself lives in `overlap-core`; this crate adds
//! the axum router, error-to-status mapping, and environment-driven
//! configuration.

mod config;
pub mod http;

pub use config::ServerConfig;
