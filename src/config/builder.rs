//! Configuration builder
//!
//! This module provides a builder pattern for turning flags and the options
//! channel into a synthesized configuration.

use log::{debug, info, warn};

use crate::config::defaults::KEY_LOG_LEVEL;
use crate::config::error::{ConfigError, Result};
use crate::config::resolver;
use crate::config::source::{OptionsSource, ParameterSource};
use crate::config::types::{EffectiveParameters, FlagValues, LogLevel, RoleCapability};
use crate::synth::{self, SynthesizedConfig};

/// Configuration builder
///
/// Provides a fluent API for resolving parameters from flags and the
/// options channel.
pub struct ConfigBuilder {
    flags: FlagValues,
    options: Option<Box<dyn ParameterSource>>,
    /// Options channel failure, reported once logging is up
    options_error: Option<ConfigError>,
    capability: RoleCapability,
}

impl ConfigBuilder {
    /// Create a new configuration builder over typed flags
    pub fn new(flags: FlagValues) -> Self {
        Self {
            flags,
            options: None,
            options_error: None,
            capability: RoleCapability::default(),
        }
    }

    /// Set which roles this adapter may take
    pub fn with_capability(mut self, capability: RoleCapability) -> Self {
        debug!("Role capability: {}", capability);
        self.capability = capability;
        self
    }

    /// Add the options channel from the SIP003 environment
    ///
    /// A malformed options string is not fatal: only the flags are used and
    /// a warning is logged by [`build`](Self::build).
    pub fn with_env(self) -> Self {
        self.with_channel(OptionsSource::from_env())
    }

    /// Add the outcome of reading an options channel
    pub fn with_channel(mut self, channel: Result<Option<OptionsSource>>) -> Self {
        match channel {
            Ok(Some(source)) => {
                debug!("Adding plugin options channel with {} keys", source.len());
                self.options_error = None;
                self.with_options(source)
            }
            Ok(None) => {
                debug!("No plugin options channel, using flags only");
                self
            }
            Err(e) => {
                self.options = None;
                self.options_error = Some(e);
                self
            }
        }
    }

    /// Error from reading the options channel, if it was malformed
    pub fn options_error(&self) -> Option<&ConfigError> {
        self.options_error.as_ref()
    }

    /// Add an explicit options source, replacing any previous one
    pub fn with_options(mut self, source: impl ParameterSource + 'static) -> Self {
        self.options = Some(Box::new(source));
        self
    }

    /// Log level the adapter should run at
    ///
    /// Read ahead of resolution so the logger can be set up first. An
    /// unparsable level falls back to the default.
    pub fn log_level(&self) -> LogLevel {
        self.options
            .as_ref()
            .and_then(|o| o.get(KEY_LOG_LEVEL))
            .unwrap_or_else(|| self.flags.log_level.clone())
            .parse()
            .unwrap_or_default()
    }

    /// Resolve and validate the effective parameters
    pub fn build(&self) -> Result<EffectiveParameters> {
        if let Some(e) = &self.options_error {
            warn!("{}, using flags only", e);
        }

        let params = resolver::resolve(&self.flags, self.options.as_deref(), self.capability)?;

        info!(
            "Running as {} on {} port {}, forwarding to {}",
            params.role(),
            params
                .local_address()
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            params.local_port(),
            params.remote_address().with_port(params.remote_port()),
        );

        Ok(params)
    }

    /// Resolve, validate and synthesize the configuration
    pub fn synthesize(&self) -> Result<SynthesizedConfig> {
        let params = self.build()?;
        synth::synthesize(&params)
    }
}
