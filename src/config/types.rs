//! Configuration types
//!
//! This module contains the parameter types shared by the resolver, the
//! validator and the synthesizer.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::config::error::ConfigError;

/// Side of the tunnel this process plays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Originates traffic: listens for the local application, dials the server
    Client,
    /// Terminates traffic: accepts tunnel connections, forwards to the local service
    Server,
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// Which roles a build of the adapter may take
///
/// Some deployments ship a client-only or server-only adapter; the
/// capability decides how a role request is honoured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoleCapability {
    /// Both roles, selected by the `server` flag or option
    Dual,
    /// Always a client; server requests are ignored and no swap happens
    ClientOnly,
    /// Always a server
    ServerOnly,
}

impl Default for RoleCapability {
    fn default() -> Self {
        RoleCapability::Dual
    }
}

impl fmt::Display for RoleCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleCapability::Dual => write!(f, "dual"),
            RoleCapability::ClientOnly => write!(f, "client-only"),
            RoleCapability::ServerOnly => write!(f, "server-only"),
        }
    }
}

impl FromStr for RoleCapability {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dual" => Ok(Self::Dual),
            "client-only" => Ok(Self::ClientOnly),
            "server-only" => Ok(Self::ServerOnly),
            _ => Err(ConfigError::parse(
                "role capability",
                s,
                "valid values are: dual, client-only, server-only",
            )),
        }
    }
}

/// Transport framing beneath the proxy protocol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Websocket framing, the only implemented mode
    Websocket,
    /// Recognized but not implemented
    Quic,
}

impl TransportMode {
    /// Whether a transport can be built for this mode
    pub fn is_implemented(&self) -> bool {
        matches!(self, TransportMode::Websocket)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Websocket => write!(f, "websocket"),
            TransportMode::Quic => write!(f, "quic"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "websocket" => Ok(Self::Websocket),
            "quic" => Ok(Self::Quic),
            _ => Err(ConfigError::UnsupportedMode(s.to_string())),
        }
    }
}

/// Engine log verbosity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    None,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warning
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::None => write!(f, "none"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::parse(
                defaults::KEY_LOG_LEVEL,
                s,
                "valid values are: debug, info, warning, error, none",
            )),
        }
    }
}

/// Source of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Flag default, never given on the command line
    Default,
    /// From a command line flag
    CommandLine,
    /// From the plugin options channel
    Options,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::CommandLine => write!(f, "command line"),
            ValueSource::Options => write!(f, "plugin options"),
        }
    }
}

/// A bind or destination host: an IP literal or a domain name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Domain(String),
}

impl Host {
    /// Whether the host is an IPv6 literal (needs brackets in `host:port`)
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Host::Ip(IpAddr::V6(_)))
    }

    /// Render as `host:port`
    pub fn with_port(&self, port: u16) -> String {
        if self.is_ipv6() {
            format!("[{}]:{}", self, port)
        } else {
            format!("{}:{}", self, port)
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(ip) => write!(f, "{}", ip),
            Host::Domain(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for Host {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let unbracketed = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        if let Ok(ip) = unbracketed.parse::<IpAddr>() {
            return Ok(Host::Ip(ip));
        }

        if s.is_empty() {
            return Err("empty host".to_string());
        }
        if s.len() > 253 {
            return Err(format!("host name longer than 253 bytes: {}", s));
        }
        if let Some(c) = s.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))) {
            return Err(format!("unexpected character {:?} in host {}", c, s));
        }

        Ok(Host::Domain(s.to_string()))
    }
}

/// Typed process flags
///
/// Every field carries the flag default, so a `FlagValues` always answers
/// every key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagValues {
    pub local_addr: String,
    pub local_port: String,
    pub remote_addr: String,
    pub remote_port: String,
    pub path: String,
    pub host: String,
    pub mode: String,
    pub mux: u16,
    pub server: bool,
    pub log_level: String,
    /// Keys the user actually passed, used only for provenance logging
    pub explicit: Vec<&'static str>,
}

impl Default for FlagValues {
    fn default() -> Self {
        Self {
            local_addr: defaults::LOCAL_ADDR.to_string(),
            local_port: defaults::LOCAL_PORT.to_string(),
            remote_addr: defaults::REMOTE_ADDR.to_string(),
            remote_port: defaults::REMOTE_PORT.to_string(),
            path: defaults::PATH.to_string(),
            host: defaults::HOST.to_string(),
            mode: defaults::MODE.to_string(),
            mux: defaults::MUX,
            server: false,
            log_level: defaults::LOG_LEVEL.to_string(),
            explicit: Vec::new(),
        }
    }
}

/// The resolved, role-aware parameter set
///
/// Built once by the resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveParameters {
    pub(crate) role: Role,
    pub(crate) local_address: Vec<Host>,
    pub(crate) local_port: u16,
    pub(crate) remote_address: Host,
    pub(crate) remote_port: u16,
    pub(crate) transport_mode: TransportMode,
    pub(crate) websocket_path: String,
    pub(crate) websocket_host: String,
    pub(crate) mux_concurrency: u16,
    pub(crate) log_level: LogLevel,
    pub(crate) managed_network: bool,
}

impl EffectiveParameters {
    /// Active role
    pub fn role(&self) -> Role {
        self.role
    }

    /// Bind addresses, in input order, never empty
    pub fn local_address(&self) -> &[Host] {
        &self.local_address
    }

    /// Bind port
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Upstream host
    pub fn remote_address(&self) -> &Host {
        &self.remote_address
    }

    /// Upstream port
    pub fn remote_port(&self) -> u16 {
        self.remote_port
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn websocket_path(&self) -> &str {
        &self.websocket_path
    }

    pub fn websocket_host(&self) -> &str {
        &self.websocket_host
    }

    /// Mux concurrency hint, `0` disables multiplexing
    pub fn mux_concurrency(&self) -> u16 {
        self.mux_concurrency
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Whether the host asked for managed-network (VPN) socket protection
    pub fn managed_network(&self) -> bool {
        self.managed_network
    }

    /// Whether connection reuse is requested
    pub fn mux_enabled(&self) -> bool {
        self.mux_concurrency != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_parsing() {
        assert_eq!("1.2.3.4".parse::<Host>(), Ok(Host::Ip("1.2.3.4".parse().unwrap())));
        assert_eq!("[::1]".parse::<Host>(), Ok(Host::Ip("::1".parse().unwrap())));
        assert_eq!(
            "example.com".parse::<Host>(),
            Ok(Host::Domain("example.com".to_string()))
        );
        assert!("".parse::<Host>().is_err());
        assert!("bad host".parse::<Host>().is_err());
        assert!("a/b".parse::<Host>().is_err());
    }

    #[test]
    fn test_host_with_port() {
        let v6: Host = "::1".parse().unwrap();
        assert_eq!(v6.with_port(1080), "[::1]:1080");
        let v4: Host = "10.0.0.1".parse().unwrap();
        assert_eq!(v4.with_port(80), "10.0.0.1:80");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("websocket".parse::<TransportMode>(), Ok(TransportMode::Websocket));
        assert_eq!("quic".parse::<TransportMode>(), Ok(TransportMode::Quic));
        assert!(TransportMode::Websocket.is_implemented());
        assert!(!TransportMode::Quic.is_implemented());
        assert_eq!(
            "grpc".parse::<TransportMode>(),
            Err(ConfigError::UnsupportedMode("grpc".to_string()))
        );
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("none".parse::<LogLevel>(), Ok(LogLevel::None));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::default().to_string(), "warning");
    }

    #[test]
    fn test_flag_defaults() {
        let flags = FlagValues::default();
        assert_eq!(flags.local_addr, "127.0.0.1");
        assert_eq!(flags.local_port, "1984");
        assert_eq!(flags.remote_port, "1080");
        assert_eq!(flags.mode, "websocket");
        assert_eq!(flags.mux, 1);
        assert!(!flags.server);
    }
}
