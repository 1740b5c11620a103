//! Logging helpers
//!
//! Wires the `log` facade to `env_logger`.

use crate::config::LogLevel;

/// Filter string understood by `env_logger` for a plugin log level
pub fn filter_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
        LogLevel::None => "off",
    }
}

/// Initialize the logger
///
/// `RUST_LOG` takes precedence over `level` when it is set.
///
/// # Parameters
///
/// * `level` - Log level requested through the plugin flags
pub fn init_logger(level: LogLevel) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", filter_for(level));

    // A second initialization (tests, embedders) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}
