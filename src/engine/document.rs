//! Engine-facing JSON document
//!
//! Renders a [`SynthesizedConfig`] in the engine's JSON schema. Dispatcher and
//! proxy manager apps are implicit in that schema and are not written out.

use serde_json::{json, Map, Value};

use crate::config::TransportMode;
use crate::synth::{InboundSpec, LogSpec, OutboundSpec, StreamSettings, SynthesizedConfig};

/// Render the whole configuration
pub fn render(config: &SynthesizedConfig) -> Value {
    let mut doc = Map::new();

    if let Some(spec) = config.log() {
        doc.insert("log".to_string(), log(&spec));
    }
    doc.insert(
        "inbounds".to_string(),
        Value::Array(config.inbounds.iter().map(inbound).collect()),
    );
    doc.insert(
        "outbounds".to_string(),
        Value::Array(vec![outbound(&config.outbound)]),
    );

    Value::Object(doc)
}

fn log(spec: &LogSpec) -> Value {
    let level = serde_json::to_value(spec.level).unwrap_or(Value::Null);
    let access = if spec.access_log { Value::Null } else { json!("none") };
    json!({
        "loglevel": level,
        "access": access,
    })
}

fn stream(settings: &StreamSettings) -> Value {
    let headers: Map<String, Value> = settings
        .websocket
        .headers
        .iter()
        .map(|h| (h.key.clone(), Value::String(h.value.clone())))
        .collect();

    match settings.protocol {
        TransportMode::Websocket => json!({
            "network": "ws",
            "wsSettings": {
                "path": settings.websocket.path,
                "headers": headers,
            },
        }),
        TransportMode::Quic => json!({ "network": "quic" }),
    }
}

fn inbound(spec: &InboundSpec) -> Value {
    let networks: Vec<&str> = spec.forward.networks.iter().map(|n| n.as_str()).collect();

    let mut value = json!({
        "listen": spec.listen.to_string(),
        "port": spec.port,
        "protocol": "dokodemo-door",
        "settings": {
            "address": spec.forward.target.host(),
            "network": networks.join(","),
        },
    });
    if let (Some(settings), Some(obj)) = (&spec.stream, value.as_object_mut()) {
        obj.insert("streamSettings".to_string(), stream(settings));
    }
    value
}

fn outbound(spec: &OutboundSpec) -> Value {
    let mut value = json!({
        "protocol": "freedom",
        "settings": {
            "redirect": spec.destination.to_string(),
        },
    });

    if let Some(obj) = value.as_object_mut() {
        if let Some(settings) = &spec.stream {
            obj.insert("streamSettings".to_string(), stream(settings));
        }
        if let Some(sender) = &spec.sender {
            obj.insert(
                "mux".to_string(),
                json!({
                    "enabled": sender.mux.enabled,
                    "concurrency": sender.mux.concurrency,
                }),
            );
        }
    }
    value
}
