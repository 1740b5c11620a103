//! Common module
//!
//! This module contains shared errors and logging helpers used throughout the application.

pub mod error;
pub mod log;

// Re-export commonly used types and functions
pub use error::{AdapterError, Result, EXIT_CONFIG_ERROR, EXIT_ENGINE_ERROR};
pub use log::init_logger;
