//! Common utilities shared across the harness crates.
//!
//! This crate provides:
//! - Unified error handling for local checks, contracts and transport
//! - Configuration loaded from the environment

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
