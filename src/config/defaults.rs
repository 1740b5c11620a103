//! Default configuration values
//!
//! This module provides default values for configuration options.
//! It is the single source of truth for flag defaults, option key names
//! and the fixed protocol constants shared with the engine.

// Flag defaults

/// Default local address
pub const LOCAL_ADDR: &str = "127.0.0.1";

/// Default local port
pub const LOCAL_PORT: &str = "1984";

/// Default remote address
pub const REMOTE_ADDR: &str = "127.0.0.1";

/// Default remote port
pub const REMOTE_PORT: &str = "1080";

/// Default websocket path
pub const PATH: &str = "/";

/// Default websocket `Host` header
pub const HOST: &str = "cloudfront.com";

/// Default transport mode
pub const MODE: &str = "websocket";

/// Default mux concurrency, non-zero enables multiplexing
pub const MUX: u16 = 1;

/// Default log level
pub const LOG_LEVEL: &str = "warning";

// Option keys, shared by flags and the options channel

pub const KEY_LOCAL_ADDR: &str = "localAddr";
pub const KEY_LOCAL_PORT: &str = "localPort";
pub const KEY_REMOTE_ADDR: &str = "remoteAddr";
pub const KEY_REMOTE_PORT: &str = "remotePort";
pub const KEY_PATH: &str = "path";
pub const KEY_HOST: &str = "host";
pub const KEY_MODE: &str = "mode";
pub const KEY_MUX: &str = "mux";
pub const KEY_SERVER: &str = "server";
pub const KEY_LOG_LEVEL: &str = "loglevel";
pub const KEY_MANAGED_NETWORK: &str = "__android_vpn";

// SIP003 environment protocol

pub const ENV_REMOTE_HOST: &str = "SS_REMOTE_HOST";
pub const ENV_REMOTE_PORT: &str = "SS_REMOTE_PORT";
pub const ENV_LOCAL_HOST: &str = "SS_LOCAL_HOST";
pub const ENV_LOCAL_PORT: &str = "SS_LOCAL_PORT";
pub const ENV_PLUGIN_OPTIONS: &str = "SS_PLUGIN_OPTIONS";

/// Separator between bind addresses in `localAddr`
pub const ADDR_SEPARATOR: char = '|';

/// Loopback placeholder the forwarding inbound points at
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// Reserved hostname telling the dispatcher that inbound connections carry
/// multiplexed sessions and must be demultiplexed before forwarding.
///
/// This is a wire contract with the engine and must never change.
pub const MUX_COOL_HOST: &str = "v1.mux.cool";

/// Engine started when no `--engine` flag is given
pub const ENGINE_BIN: &str = "v2ray";

/// Arguments making the default engine read a JSON document from stdin
pub const ENGINE_ARGS: [&str; 5] = ["run", "-format", "json", "-config", "stdin:"];
