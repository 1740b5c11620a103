//! Transport settings builder

use crate::config::error::{ConfigError, Result};
use crate::config::TransportMode;
use crate::synth::{Header, StreamSettings, WebsocketSettings};

/// Transport-stream settings plus the connection reuse decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub stream: StreamSettings,
    pub connection_reuse: bool,
}

/// Build the transport settings for `mode`
///
/// Fails before anything else is built when the mode is not implemented.
pub fn build_transport(mode: TransportMode, path: &str, host: &str, mux: u16) -> Result<Transport> {
    match mode {
        TransportMode::Websocket => Ok(Transport {
            stream: StreamSettings {
                protocol: mode,
                websocket: WebsocketSettings {
                    path: path.to_string(),
                    headers: vec![Header {
                        key: "Host".to_string(),
                        value: host.to_string(),
                    }],
                },
            },
            connection_reuse: mux != 0,
        }),
        other => Err(ConfigError::UnsupportedMode(other.to_string())),
    }
}
