// src/utils/mod.rs
//! Common utilities shared across the engine
//!
//! - **errors**: the crate-wide error type and `Result` alias
//! - **config**: layered engine configuration

pub mod config;
pub mod errors;

pub use config::EngineConfig;
pub use errors::{EngineError, Result};
