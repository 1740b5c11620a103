//! Command line tests
//!
//! These tests run the plugin binary the way a SIP003 host launches it.

use std::process::{Command, Output};

const SS_VARS: [&str; 5] = [
    "SS_REMOTE_HOST",
    "SS_REMOTE_PORT",
    "SS_LOCAL_HOST",
    "SS_LOCAL_PORT",
    "SS_PLUGIN_OPTIONS",
];

fn run_plugin(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sip003-adapter"));
    command.args(args).env_remove("RUST_LOG");
    for var in SS_VARS {
        command.env_remove(var);
    }
    command.envs(env.iter().copied());
    command.output().expect("Failed to run plugin binary")
}

/// A malformed options string is reported and the flags are used
#[test]
fn test_malformed_options_warning() {
    let output = run_plugin(
        &["--print-config"],
        &[
            ("SS_REMOTE_HOST", "203.0.113.10"),
            ("SS_REMOTE_PORT", "443"),
            ("SS_PLUGIN_OPTIONS", "mux=4;=oops"),
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed plugin options"), "stderr: {}", stderr);
    assert!(stderr.contains("using flags only"), "stderr: {}", stderr);

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["outbounds"][0]["settings"]["redirect"], "127.0.0.1:1080");
    assert_eq!(doc["outbounds"][0]["mux"]["concurrency"], 1);
}

/// Single-dash flags as passed through `plugin_args`
#[test]
fn test_single_dash_flags() {
    let output = run_plugin(
        &["-localPort", "2000", "-mux=0", "-print-config"],
        &[],
    );

    assert_eq!(output.status.code(), Some(0));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["inbounds"][0]["port"], 2000);
    assert!(doc["outbounds"][0].get("mux").is_none());
}

/// Configuration errors exit with the dedicated code
#[test]
fn test_config_error_exit_code() {
    let output = run_plugin(&["-localPort", "0", "-print-config"], &[]);
    assert_eq!(output.status.code(), Some(23));

    let output = run_plugin(
        &["--print-config"],
        &[("SS_REMOTE_HOST", "203.0.113.10"), ("SS_PLUGIN_OPTIONS", "mode=quic")],
    );
    assert_eq!(output.status.code(), Some(23));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported mode: quic"), "stderr: {}", stderr);
}
