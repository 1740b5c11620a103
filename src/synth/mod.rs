//! Configuration synthesis
//!
//! Turns [`EffectiveParameters`](crate::config::EffectiveParameters) into the
//! listener-to-forwarder graph the proxy engine runs. The graph is a plain
//! value: it is built once, handed to the engine and never mutated.

pub mod topology;
pub mod transport;

pub use self::topology::synthesize;
pub use self::transport::{build_transport, Transport};

use crate::config::defaults::{LOOPBACK_HOST, MUX_COOL_HOST};
use crate::config::{Host, LogLevel, TransportMode};

/// A single HTTP header sent on the websocket upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// Websocket path and headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsocketSettings {
    pub path: String,
    pub headers: Vec<Header>,
}

/// How bytes are framed on the wire beneath the proxy protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    pub protocol: TransportMode,
    pub websocket: WebsocketSettings,
}

/// Network accepted by a forwarding inbound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
        }
    }
}

/// What a forwarding inbound hands its connections to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardTarget {
    /// Plain streams, forwarded to the loopback placeholder
    Loopback,
    /// Multiplexed sessions, demultiplexed by the dispatcher before forwarding
    MuxSession,
}

impl ForwardTarget {
    /// Placeholder host the engine schema expects for this target
    pub fn host(&self) -> &'static str {
        match self {
            ForwardTarget::Loopback => LOOPBACK_HOST,
            ForwardTarget::MuxSession => MUX_COOL_HOST,
        }
    }
}

/// Proxy behaviour attached to an inbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardSpec {
    pub target: ForwardTarget,
    pub networks: Vec<Network>,
}

/// One listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundSpec {
    pub listen: Host,
    pub port: u16,
    /// Present when the listener itself terminates the transport framing
    pub stream: Option<StreamSettings>,
    pub forward: ForwardSpec,
}

/// Destination override of the forwarding outbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: Host,
    pub port: u16,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.host.with_port(self.port))
    }
}

/// Multiplexing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxSpec {
    pub enabled: bool,
    pub concurrency: u16,
}

/// Sender settings attached to the outbound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderSpec {
    pub mux: MuxSpec,
}

/// The single forwarding outbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSpec {
    pub destination: Destination,
    /// Absent means plain TCP egress
    pub stream: Option<StreamSettings>,
    pub sender: Option<SenderSpec>,
}

/// Engine log settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSpec {
    pub level: LogLevel,
    pub access_log: bool,
}

/// Application-level declarations included in every configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppSpec {
    Dispatcher,
    InboundManager,
    OutboundManager,
    Log(LogSpec),
}

/// The complete configuration graph handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedConfig {
    pub inbounds: Vec<InboundSpec>,
    pub outbound: OutboundSpec,
    pub apps: Vec<AppSpec>,
}

impl SynthesizedConfig {
    /// Log settings, if a log app is declared
    pub fn log(&self) -> Option<LogSpec> {
        self.apps.iter().find_map(|app| match app {
            AppSpec::Log(spec) => Some(*spec),
            _ => None,
        })
    }
}
