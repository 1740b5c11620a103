//! Parameter sources
//!
//! This module defines the key/value lookup contract the resolver reads
//! overrides through, and the options channel the SIP003 host fills in
//! through environment variables.

use std::collections::HashMap;
use std::env;
use log::debug;

use crate::config::defaults::{
    ENV_LOCAL_HOST, ENV_LOCAL_PORT, ENV_PLUGIN_OPTIONS, ENV_REMOTE_HOST, ENV_REMOTE_PORT,
    KEY_LOCAL_ADDR, KEY_LOCAL_PORT, KEY_REMOTE_ADDR, KEY_REMOTE_PORT,
};
use crate::config::error::Result;
use crate::config::plugin_opts::PluginOptions;
use crate::config::types::ValueSource;

/// Key/value parameter source
#[cfg_attr(test, mockall::automock)]
pub trait ParameterSource {
    /// Value for `key`, `None` when the key is absent
    fn get(&self, key: &str) -> Option<String>;

    /// Get the source type
    fn source_type(&self) -> ValueSource;
}

/// The options channel populated by the SIP003 host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsSource {
    values: HashMap<String, String>,
}

impl OptionsSource {
    /// Create a source from explicit key/value pairs
    ///
    /// A repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Read the options channel from the process environment
    ///
    /// Returns `Ok(None)` when the host did not set `SS_REMOTE_HOST`.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the options channel through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let remote_host = match lookup(ENV_REMOTE_HOST) {
            Some(host) if !host.is_empty() => host,
            _ => {
                debug!("{} not set, no plugin options channel", ENV_REMOTE_HOST);
                return Ok(None);
            }
        };

        let mut values = HashMap::new();
        values.insert(KEY_REMOTE_ADDR.to_string(), remote_host);

        let env_keys = [
            (ENV_REMOTE_PORT, KEY_REMOTE_PORT),
            (ENV_LOCAL_HOST, KEY_LOCAL_ADDR),
            (ENV_LOCAL_PORT, KEY_LOCAL_PORT),
        ];
        for (env_name, key) in env_keys {
            if let Some(value) = lookup(env_name) {
                debug!("Found environment variable {}={}", env_name, value);
                values.insert(key.to_string(), value);
            }
        }

        if let Some(raw) = lookup(ENV_PLUGIN_OPTIONS).filter(|s| !s.is_empty()) {
            debug!("Parsing {}={}", ENV_PLUGIN_OPTIONS, raw);
            let options = PluginOptions::parse(&raw)?;

            // Plugin options win over the SS_* variables; within the options
            // string the first occurrence of a key wins.
            let mut seen = Vec::new();
            for (key, value) in options.iter() {
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                values.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Some(Self { values }))
    }

    /// Whether the channel carries `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParameterSource for OptionsSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn source_type(&self) -> ValueSource {
        ValueSource::Options
    }
}
