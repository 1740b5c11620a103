//! Topology synthesizer
//!
//! A client listens for the local application on one plain TCP inbound and
//! carries the transport framing (and multiplexing, when enabled) on its
//! outbound. A server terminates the framing on one inbound per bind address
//! and forwards plain TCP.

use log::{debug, warn};

use crate::config::error::Result;
use crate::config::{EffectiveParameters, LogLevel, Role};
use crate::synth::transport::{build_transport, Transport};
use crate::synth::{
    AppSpec, Destination, ForwardSpec, ForwardTarget, InboundSpec, LogSpec, MuxSpec, Network,
    OutboundSpec, SenderSpec, SynthesizedConfig,
};

/// Synthesize the configuration graph for `params`
pub fn synthesize(params: &EffectiveParameters) -> Result<SynthesizedConfig> {
    let transport = build_transport(
        params.transport_mode(),
        params.websocket_path(),
        params.websocket_host(),
        params.mux_concurrency(),
    )?;

    let config = match params.role() {
        Role::Client => client(params, transport),
        Role::Server => server(params, transport),
    };

    debug!(
        "Synthesized {} inbound(s), outbound to {}, mux {}",
        config.inbounds.len(),
        config.outbound.destination,
        if config.outbound.sender.is_some() { "on" } else { "off" },
    );

    Ok(config)
}

fn forward_target(connection_reuse: bool) -> ForwardTarget {
    if connection_reuse {
        ForwardTarget::MuxSession
    } else {
        ForwardTarget::Loopback
    }
}

fn destination(params: &EffectiveParameters) -> Destination {
    Destination {
        host: params.remote_address().clone(),
        port: params.remote_port(),
    }
}

fn apps(level: LogLevel) -> Vec<AppSpec> {
    vec![
        AppSpec::Dispatcher,
        AppSpec::InboundManager,
        AppSpec::OutboundManager,
        AppSpec::Log(LogSpec {
            level,
            access_log: false,
        }),
    ]
}

fn client(params: &EffectiveParameters, transport: Transport) -> SynthesizedConfig {
    let addrs = params.local_address();
    if addrs.len() > 1 {
        warn!("Client listens on a single address, ignoring all but {}", addrs[0]);
    }

    let inbound = InboundSpec {
        listen: addrs[0].clone(),
        port: params.local_port(),
        stream: None,
        forward: ForwardSpec {
            target: forward_target(transport.connection_reuse),
            networks: vec![Network::Tcp],
        },
    };

    let outbound = if transport.connection_reuse {
        OutboundSpec {
            destination: destination(params),
            stream: Some(transport.stream),
            sender: Some(SenderSpec {
                mux: MuxSpec {
                    enabled: true,
                    concurrency: params.mux_concurrency(),
                },
            }),
        }
    } else {
        OutboundSpec {
            destination: destination(params),
            stream: None,
            sender: None,
        }
    };

    SynthesizedConfig {
        inbounds: vec![inbound],
        outbound,
        apps: apps(params.log_level()),
    }
}

fn server(params: &EffectiveParameters, transport: Transport) -> SynthesizedConfig {
    let target = forward_target(transport.connection_reuse);

    let inbounds = params
        .local_address()
        .iter()
        .map(|listen| InboundSpec {
            listen: listen.clone(),
            port: params.local_port(),
            stream: Some(transport.stream.clone()),
            forward: ForwardSpec {
                target,
                networks: vec![Network::Tcp],
            },
        })
        .collect();

    SynthesizedConfig {
        inbounds,
        outbound: OutboundSpec {
            destination: destination(params),
            stream: None,
            sender: None,
        },
        apps: apps(params.log_level()),
    }
}
