//! Configuration validator
//!
//! Last gate between merged parameters and synthesis. Checks run in a fixed
//! order: ports, transport mode, then the bind address list and host syntax.
//! On failure nothing typed is produced.

use log::warn;

use crate::config::defaults::{
    ADDR_SEPARATOR, KEY_LOCAL_ADDR, KEY_LOCAL_PORT, KEY_REMOTE_ADDR, KEY_REMOTE_PORT,
};
use crate::config::error::{ConfigError, Result};
use crate::config::resolver::RawParameters;
use crate::config::types::{EffectiveParameters, Host, TransportMode};

/// Validate merged parameters and produce [`EffectiveParameters`]
pub fn validate(raw: RawParameters) -> Result<EffectiveParameters> {
    let local_port = parse_port(KEY_LOCAL_PORT, &raw.endpoints.local_port)?;
    let remote_port = parse_port(KEY_REMOTE_PORT, &raw.endpoints.remote_port)?;

    let transport_mode = raw.mode.parse::<TransportMode>()?;
    if !transport_mode.is_implemented() {
        return Err(ConfigError::UnsupportedMode(transport_mode.to_string()));
    }

    let local_address = parse_local_addrs(&raw.endpoints.local_addr)?;
    let remote_address = raw
        .endpoints
        .remote_addr
        .parse::<Host>()
        .map_err(|reason| ConfigError::validation(KEY_REMOTE_ADDR, reason))?;

    Ok(EffectiveParameters {
        role: raw.role,
        local_address,
        local_port,
        remote_address,
        remote_port,
        transport_mode,
        websocket_path: raw.path,
        websocket_host: raw.host,
        mux_concurrency: raw.mux,
        log_level: raw.log_level,
        managed_network: raw.managed_network,
    })
}

/// Parse a port in 1..=65535
pub fn parse_port(field: &str, value: &str) -> Result<u16> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::parse(field, value, e.to_string()))?;

    if port == 0 {
        return Err(ConfigError::parse(field, value, "port must be between 1 and 65535"));
    }

    Ok(port)
}

/// Split a `|`-delimited bind address list
///
/// Empty segments are dropped; repeated addresses keep their first position.
pub fn parse_local_addrs(value: &str) -> Result<Vec<Host>> {
    let mut hosts: Vec<Host> = Vec::new();

    for segment in value.split(ADDR_SEPARATOR).map(str::trim) {
        if segment.is_empty() {
            continue;
        }

        let host = segment
            .parse::<Host>()
            .map_err(|reason| ConfigError::validation(KEY_LOCAL_ADDR, reason))?;

        if hosts.contains(&host) {
            warn!("Duplicate bind address {} ignored", host);
            continue;
        }
        hosts.push(host);
    }

    if hosts.is_empty() {
        return Err(ConfigError::validation(
            KEY_LOCAL_ADDR,
            format!("no bind address in {:?}", value),
        ));
    }

    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolver::merge;
    use crate::config::source::OptionsSource;
    use crate::config::types::{FlagValues, RoleCapability};

    fn raw_with(pairs: &[(&str, &str)]) -> RawParameters {
        let options = OptionsSource::from_pairs(pairs.iter().copied());
        merge(&FlagValues::default(), Some(&options), RoleCapability::Dual)
    }

    #[test]
    fn test_parse_port_bounds() {
        assert_eq!(parse_port("localPort", "1"), Ok(1));
        assert_eq!(parse_port("localPort", "65535"), Ok(65535));
        assert!(matches!(parse_port("localPort", "0"), Err(ConfigError::Parse { .. })));
        assert!(matches!(parse_port("localPort", "70000"), Err(ConfigError::Parse { .. })));
        assert!(matches!(parse_port("localPort", "-1"), Err(ConfigError::Parse { .. })));
        assert!(matches!(parse_port("localPort", "http"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_local_addr_list() {
        let hosts = parse_local_addrs("1.2.3.4|5.6.7.8").unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].to_string(), "1.2.3.4");
        assert_eq!(hosts[1].to_string(), "5.6.7.8");

        let hosts = parse_local_addrs("::|0.0.0.0|::").unwrap();
        assert_eq!(hosts.len(), 2);

        assert!(matches!(parse_local_addrs("||"), Err(ConfigError::Validation { .. })));
        assert!(matches!(parse_local_addrs(""), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_check_order_ports_before_mode() {
        let raw = raw_with(&[("localPort", "0"), ("mode", "quic-ish")]);
        let err = validate(raw).unwrap_err();
        assert_eq!(err.field(), Some("localPort"));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let raw = raw_with(&[("mode", "grpc")]);
        assert_eq!(
            validate(raw).unwrap_err(),
            ConfigError::UnsupportedMode("grpc".to_string())
        );
    }

    #[test]
    fn test_unimplemented_mode_rejected_before_addresses() {
        let raw = raw_with(&[("mode", "quic"), ("localAddr", "||")]);
        assert_eq!(
            validate(raw).unwrap_err(),
            ConfigError::UnsupportedMode("quic".to_string())
        );
    }

    #[test]
    fn test_bad_remote_host() {
        let raw = raw_with(&[("remoteAddr", "exa mple")]);
        let err = validate(raw).unwrap_err();
        assert_eq!(err.field(), Some("remoteAddr"));
    }

    #[test]
    fn test_valid_defaults() {
        let params = validate(merge(&FlagValues::default(), None, RoleCapability::Dual)).unwrap();
        assert_eq!(params.local_port(), 1984);
        assert_eq!(params.remote_port(), 1080);
        assert_eq!(params.local_address().len(), 1);
        assert_eq!(params.transport_mode(), TransportMode::Websocket);
    }
}
