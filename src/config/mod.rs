//! Configuration module
//!
//! This module turns the two parameter channels of a SIP003 plugin (process
//! flags and the environment options string) into one validated, role-aware
//! parameter set.

// Submodules
pub mod builder;
pub mod defaults;
pub mod error;
pub mod plugin_opts;
pub mod resolver;
pub mod source;
pub mod types;
pub mod validator;

// Re-export types and traits
pub use self::builder::ConfigBuilder;
pub use self::error::ConfigError;
pub use self::plugin_opts::PluginOptions;
pub use self::resolver::{resolve, resolve_addresses, AddressKeys, Endpoints, RawParameters};
pub use self::source::{OptionsSource, ParameterSource};
pub use self::types::{
    EffectiveParameters, FlagValues, Host, LogLevel, Role, RoleCapability, TransportMode,
    ValueSource,
};

// Export constants needed externally
pub use self::defaults::{LOOPBACK_HOST, MUX_COOL_HOST};
