// src/observability/mod.rs
//! Tracing setup
//!
//! Structured logging via `tracing`, filtered through `RUST_LOG` with an
//! `info` default. JSON output is available for log shippers.

use crate::utils::errors::{EngineError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Call once, before anything logs.
pub fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EngineError::Setup(format!("tracing init failed: {}", e)))
}
