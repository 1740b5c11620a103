//! SIP003 Adapter: websocket transport plugin for Shadowsocks
//!
//! This library turns the parameters a Shadowsocks client or server hands to
//! its plugin (process flags plus the `SS_*` environment) into a complete
//! proxy engine configuration, and runs that engine.
//!
//! # Main Features
//!
//! - SIP003 environment and plugin options parsing
//! - Role-aware address resolution for client and server
//! - Websocket transport with optional connection multiplexing
//! - Engine bootstrap over stdin
//!
//! # Example
//!
//! ```no_run
//! use sip003_adapter::config::{ConfigBuilder, FlagValues};
//! use sip003_adapter::engine::{Engine, ProcessEngine};
//! use sip003_adapter::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Flags plus whatever the host process put in the environment
//!     let config = ConfigBuilder::new(FlagValues::default())
//!         .with_env()
//!         .synthesize()?;
//!
//!     let mut engine = ProcessEngine::default();
//!     engine.start(&config).await?;
//!     engine.wait().await
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod engine;
pub mod synth;

// Re-export commonly used structures and functions for convenience
pub use common::{AdapterError, Result};
pub use config::{ConfigBuilder, EffectiveParameters, FlagValues};
pub use synth::SynthesizedConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Render the engine document for `flags` and the current environment
///
/// # Example
///
/// ```no_run
/// # use sip003_adapter::{generate_config, FlagValues};
/// let doc = generate_config(FlagValues::default())?;
/// println!("{}", doc);
/// # Ok::<(), sip003_adapter::AdapterError>(())
/// ```
pub fn generate_config(flags: FlagValues) -> Result<String> {
    let config = ConfigBuilder::new(flags).with_env().synthesize()?;
    let doc = engine::document::render(&config);
    Ok(serde_json::to_string_pretty(&doc)?)
}
