//! Role and parameter resolution
//!
//! Flags establish the defaults, the options channel overrides them key by
//! key, and the role decides what the four address/port keys mean. A server
//! receives the same key names as a client but with the local and remote
//! sides reversed, so the swap is applied once, after all keys are merged,
//! using the final role.

use std::collections::HashMap;
use log::{debug, warn};

use crate::config::defaults::{
    KEY_HOST, KEY_LOCAL_ADDR, KEY_LOCAL_PORT, KEY_LOG_LEVEL, KEY_MANAGED_NETWORK, KEY_MODE,
    KEY_MUX, KEY_PATH, KEY_REMOTE_ADDR, KEY_REMOTE_PORT, KEY_SERVER,
};
use crate::config::error::Result;
use crate::config::source::ParameterSource;
use crate::config::types::{
    EffectiveParameters, FlagValues, LogLevel, Role, RoleCapability, ValueSource,
};
use crate::config::validator;

/// The four address/port values keyed by the names they arrive under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressKeys {
    pub local_addr: String,
    pub local_port: String,
    pub remote_addr: String,
    pub remote_port: String,
}

/// Address/port values from this process's own point of view
///
/// `local_*` is where this process listens, `remote_*` is where it forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub local_addr: String,
    pub local_port: String,
    pub remote_addr: String,
    pub remote_port: String,
}

/// Interpret the address keys for `role`
///
/// A client takes the keys at face value. A server listens where the host
/// calls "remote" and forwards to what the host calls "local".
pub fn resolve_addresses(role: Role, keys: &AddressKeys) -> Endpoints {
    match role {
        Role::Client => Endpoints {
            local_addr: keys.local_addr.clone(),
            local_port: keys.local_port.clone(),
            remote_addr: keys.remote_addr.clone(),
            remote_port: keys.remote_port.clone(),
        },
        Role::Server => Endpoints {
            local_addr: keys.remote_addr.clone(),
            local_port: keys.remote_port.clone(),
            remote_addr: keys.local_addr.clone(),
            remote_port: keys.local_port.clone(),
        },
    }
}

/// Merged parameters before validation
///
/// Numeric and host fields are still raw strings; the validator turns this
/// into [`EffectiveParameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameters {
    pub role: Role,
    pub endpoints: Endpoints,
    pub path: String,
    pub host: String,
    pub mode: String,
    pub mux: u16,
    pub log_level: LogLevel,
    pub managed_network: bool,
    /// Where each key's value came from
    pub sources: HashMap<&'static str, ValueSource>,
}

impl RawParameters {
    /// Provenance of a key, `"unknown"` if it was never read
    pub fn source(&self, key: &str) -> String {
        self.sources
            .get(key)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Resolve flags and the optional options channel into validated parameters
pub fn resolve(
    flags: &FlagValues,
    options: Option<&dyn ParameterSource>,
    capability: RoleCapability,
) -> Result<EffectiveParameters> {
    let raw = merge(flags, options, capability);
    log_raw(&raw);
    validator::validate(raw)
}

/// Merge flags and options without validating
pub fn merge(
    flags: &FlagValues,
    options: Option<&dyn ParameterSource>,
    capability: RoleCapability,
) -> RawParameters {
    let mut picker = Picker {
        flags,
        options,
        sources: HashMap::new(),
    };

    // Role first: the address keys cannot be interpreted without it.
    let (role, managed_network) = picker.role(capability);

    let keys = AddressKeys {
        local_addr: picker.pick(KEY_LOCAL_ADDR, &flags.local_addr),
        local_port: picker.pick(KEY_LOCAL_PORT, &flags.local_port),
        remote_addr: picker.pick(KEY_REMOTE_ADDR, &flags.remote_addr),
        remote_port: picker.pick(KEY_REMOTE_PORT, &flags.remote_port),
    };
    let endpoints = resolve_addresses(role, &keys);

    let path = picker.pick(KEY_PATH, &flags.path);
    let host = picker.pick(KEY_HOST, &flags.host);
    let mode = picker.pick(KEY_MODE, &flags.mode);
    let mux = picker.mux();
    let log_level = picker.log_level();

    RawParameters {
        role,
        endpoints,
        path,
        host,
        mode,
        mux,
        log_level,
        managed_network,
        sources: picker.sources,
    }
}

/// Reads one key at a time, preferring the options channel, and records provenance
struct Picker<'a> {
    flags: &'a FlagValues,
    options: Option<&'a dyn ParameterSource>,
    sources: HashMap<&'static str, ValueSource>,
}

impl<'a> Picker<'a> {
    fn flag_source(&self, key: &'static str) -> ValueSource {
        if self.flags.explicit.contains(&key) {
            ValueSource::CommandLine
        } else {
            ValueSource::Default
        }
    }

    fn option(&self, key: &str) -> Option<String> {
        self.options.and_then(|o| o.get(key))
    }

    fn pick(&mut self, key: &'static str, flag_value: &str) -> String {
        match self.option(key) {
            Some(value) => {
                self.sources.insert(key, ValueSource::Options);
                value
            }
            None => {
                let source = self.flag_source(key);
                self.sources.insert(key, source);
                flag_value.to_string()
            }
        }
    }

    fn role(&mut self, capability: RoleCapability) -> (Role, bool) {
        let mut server = self.flags.server;
        let mut source = self.flag_source(KEY_SERVER);

        if self.option(KEY_SERVER).is_some() {
            server = true;
            source = ValueSource::Options;
        }
        self.sources.insert(KEY_SERVER, source);

        let managed_network = self.option(KEY_MANAGED_NETWORK).is_some();
        if managed_network {
            self.sources.insert(KEY_MANAGED_NETWORK, ValueSource::Options);
        }

        let role = match capability {
            RoleCapability::Dual if managed_network => {
                if server {
                    warn!("Managed network mode requested, running as client");
                }
                Role::Client
            }
            RoleCapability::Dual if server => Role::Server,
            RoleCapability::Dual => Role::Client,
            RoleCapability::ClientOnly => {
                if server {
                    warn!("Server role requested but this adapter is client-only, ignoring");
                }
                Role::Client
            }
            RoleCapability::ServerOnly => {
                if managed_network {
                    warn!("Managed network mode is not available to a server-only adapter, ignoring");
                }
                Role::Server
            }
        };

        // A server-only adapter never protects sockets.
        let managed_network = managed_network && role == Role::Client;
        (role, managed_network)
    }

    fn mux(&mut self) -> u16 {
        let mut mux = self.flags.mux;
        let source = self.flag_source(KEY_MUX);
        self.sources.insert(KEY_MUX, source);

        if let Some(raw) = self.option(KEY_MUX) {
            match raw.trim().parse::<i64>().map(u16::try_from) {
                Ok(Ok(value)) => {
                    mux = value;
                    self.sources.insert(KEY_MUX, ValueSource::Options);
                }
                Ok(Err(_)) => warn!(
                    "mux {:?} out of range 0..={}, using {}",
                    raw,
                    u16::MAX,
                    mux
                ),
                Err(e) => warn!("failed to parse mux {:?} ({}), using {}", raw, e, mux),
            }
        }

        mux
    }

    fn log_level(&mut self) -> LogLevel {
        let flags = self.flags;
        let raw = self.pick(KEY_LOG_LEVEL, &flags.log_level);
        match raw.parse::<LogLevel>() {
            Ok(level) => level,
            Err(e) => {
                warn!("{}, using {}", e, LogLevel::default());
                LogLevel::default()
            }
        }
    }
}

fn log_raw(raw: &RawParameters) {
    debug!("=== Resolved parameters ===");
    debug!("  Role: {} (from {})", raw.role, raw.source(KEY_SERVER));
    debug!("  Local address: {}", raw.endpoints.local_addr);
    debug!("  Local port: {}", raw.endpoints.local_port);
    debug!("  Remote address: {}", raw.endpoints.remote_addr);
    debug!("  Remote port: {}", raw.endpoints.remote_port);
    debug!("  Mode: {} (from {})", raw.mode, raw.source(KEY_MODE));
    debug!("  Path: {} (from {})", raw.path, raw.source(KEY_PATH));
    debug!("  Host: {} (from {})", raw.host, raw.source(KEY_HOST));
    debug!("  Mux: {} (from {})", raw.mux, raw.source(KEY_MUX));
    debug!("  Log level: {} (from {})", raw.log_level, raw.source(KEY_LOG_LEVEL));
    if raw.managed_network {
        debug!("  Managed network: enabled");
    }
    debug!("===========================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source::{MockParameterSource, OptionsSource};

    fn keys() -> AddressKeys {
        AddressKeys {
            local_addr: "127.0.0.1".to_string(),
            local_port: "1984".to_string(),
            remote_addr: "203.0.113.7".to_string(),
            remote_port: "443".to_string(),
        }
    }

    #[test]
    fn test_resolve_addresses_client_is_identity() {
        let e = resolve_addresses(Role::Client, &keys());
        assert_eq!(e.local_addr, "127.0.0.1");
        assert_eq!(e.local_port, "1984");
        assert_eq!(e.remote_addr, "203.0.113.7");
        assert_eq!(e.remote_port, "443");
    }

    #[test]
    fn test_resolve_addresses_server_transposes() {
        let e = resolve_addresses(Role::Server, &keys());
        assert_eq!(e.local_addr, "203.0.113.7");
        assert_eq!(e.local_port, "443");
        assert_eq!(e.remote_addr, "127.0.0.1");
        assert_eq!(e.remote_port, "1984");
    }

    #[test]
    fn test_flags_only() {
        let raw = merge(&FlagValues::default(), None, RoleCapability::Dual);
        assert_eq!(raw.role, Role::Client);
        assert_eq!(raw.endpoints.local_port, "1984");
        assert_eq!(raw.mux, 1);
        assert_eq!(raw.sources[KEY_MODE], ValueSource::Default);
    }

    #[test]
    fn test_option_role_read_before_addresses() {
        let mut options = MockParameterSource::new();
        options.expect_get().returning(|key: &str| {
            let value = match key {
                KEY_SERVER => "1",
                KEY_LOCAL_ADDR => "127.0.0.1",
                KEY_LOCAL_PORT => "8388",
                KEY_REMOTE_ADDR => "0.0.0.0",
                KEY_REMOTE_PORT => "443",
                _ => return None,
            };
            Some(value.to_string())
        });

        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::Dual);

        assert_eq!(raw.role, Role::Server);
        assert_eq!(raw.endpoints.local_addr, "0.0.0.0");
        assert_eq!(raw.endpoints.local_port, "443");
        assert_eq!(raw.endpoints.remote_addr, "127.0.0.1");
        assert_eq!(raw.endpoints.remote_port, "8388");
        assert_eq!(raw.sources[KEY_SERVER], ValueSource::Options);
    }

    #[test]
    fn test_managed_network_forces_client() {
        let options = OptionsSource::from_pairs([("server", "1"), ("__android_vpn", "1")]);
        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::Dual);
        assert_eq!(raw.role, Role::Client);
        assert!(raw.managed_network);
    }

    #[test]
    fn test_capabilities() {
        let flags = FlagValues {
            server: true,
            ..FlagValues::default()
        };
        let raw = merge(&flags, None, RoleCapability::ClientOnly);
        assert_eq!(raw.role, Role::Client);
        assert_eq!(raw.endpoints.local_port, "1984");

        let raw = merge(&FlagValues::default(), None, RoleCapability::ServerOnly);
        assert_eq!(raw.role, Role::Server);
        assert_eq!(raw.endpoints.local_port, "1080");

        let options = OptionsSource::from_pairs([("__android_vpn", "1")]);
        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::ServerOnly);
        assert_eq!(raw.role, Role::Server);
        assert!(!raw.managed_network);
    }

    #[test]
    fn test_bad_mux_keeps_previous_value() {
        let flags = FlagValues {
            mux: 8,
            ..FlagValues::default()
        };
        let options = OptionsSource::from_pairs([("mux", "many")]);
        let raw = merge(&flags, Some(&options), RoleCapability::Dual);
        assert_eq!(raw.mux, 8);

        // Negative and oversized counts are rejected, never wrapped
        for value in ["-1", "70000"] {
            let options = OptionsSource::from_pairs([("mux", value)]);
            let raw = merge(&flags, Some(&options), RoleCapability::Dual);
            assert_eq!(raw.mux, 8, "mux {}", value);
            assert_ne!(raw.sources[KEY_MUX], ValueSource::Options);
        }

        let options = OptionsSource::from_pairs([("mux", "0")]);
        let raw = merge(&flags, Some(&options), RoleCapability::Dual);
        assert_eq!(raw.mux, 0);
        assert_eq!(raw.sources[KEY_MUX], ValueSource::Options);
    }

    #[test]
    fn test_bad_log_level_falls_back() {
        let options = OptionsSource::from_pairs([("loglevel", "chatty")]);
        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::Dual);
        assert_eq!(raw.log_level, LogLevel::Warning);

        let options = OptionsSource::from_pairs([("loglevel", "debug")]);
        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::Dual);
        assert_eq!(raw.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let options = OptionsSource::from_pairs([("fastOpen", "1"), ("path", "/tunnel")]);
        let raw = merge(&FlagValues::default(), Some(&options), RoleCapability::Dual);
        assert_eq!(raw.path, "/tunnel");
        assert_eq!(raw.sources[KEY_PATH], ValueSource::Options);
        assert_eq!(raw.sources[KEY_HOST], ValueSource::Default);
    }
}
