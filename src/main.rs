//! SIP003 Adapter Command Line Tool
//!
//! This binary is the plugin process a Shadowsocks client or server spawns.

use std::process;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use log::{error, info, warn};

use sip003_adapter::common::{init_logger, AdapterError, EXIT_ENGINE_ERROR};
use sip003_adapter::config::defaults::{
    ENGINE_ARGS, ENGINE_BIN, HOST, KEY_HOST, KEY_LOCAL_ADDR, KEY_LOCAL_PORT, KEY_LOG_LEVEL,
    KEY_MODE, KEY_MUX, KEY_PATH, KEY_REMOTE_ADDR, KEY_REMOTE_PORT, KEY_SERVER, LOCAL_ADDR,
    LOCAL_PORT, LOG_LEVEL, MODE, MUX, PATH, REMOTE_ADDR, REMOTE_PORT,
};
use sip003_adapter::config::{ConfigBuilder, FlagValues, RoleCapability};
use sip003_adapter::engine::{document, Engine, ProcessEngine};
use sip003_adapter::{synth, APP_NAME, VERSION};

/// SIP003 Adapter: websocket transport plugin for Shadowsocks
///
/// Long flags also take the single-dash spelling (`-localAddr`, `-mux=0`).
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Local address to listen on, `|`-separated for several
    #[clap(long = "localAddr", default_value = LOCAL_ADDR)]
    local_addr: String,

    /// Local port to listen on
    #[clap(long = "localPort", default_value = LOCAL_PORT)]
    local_port: String,

    /// Remote address to forward to
    #[clap(long = "remoteAddr", default_value = REMOTE_ADDR)]
    remote_addr: String,

    /// Remote port to forward to
    #[clap(long = "remotePort", default_value = REMOTE_PORT)]
    remote_port: String,

    /// URL path for websocket
    #[clap(long, default_value = PATH)]
    path: String,

    /// Hostname for server
    #[clap(long, default_value = HOST)]
    host: String,

    /// Transport mode: websocket, quic (unsupported)
    #[clap(long, default_value = MODE)]
    mode: String,

    /// Concurrent multiplexed connections, 0 to disable
    #[clap(long, default_value_t = MUX)]
    mux: u16,

    /// Run in server mode
    #[clap(long)]
    server: bool,

    /// Log level: debug, info, warning, error, none
    #[clap(long, default_value = LOG_LEVEL)]
    loglevel: String,

    /// Roles this adapter may take: dual, client-only, server-only
    #[clap(long, default_value = "dual")]
    capability: RoleCapability,

    /// Engine binary to run
    #[clap(long, default_value = ENGINE_BIN)]
    engine: String,

    /// Engine argument, repeatable; replaces the default arguments
    #[clap(long = "engine-arg", allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Print the engine configuration and exit
    #[clap(long)]
    print_config: bool,
}

/// Flag ids paired with the option keys they stand for
const FLAG_KEYS: [(&str, &str); 10] = [
    ("local_addr", KEY_LOCAL_ADDR),
    ("local_port", KEY_LOCAL_PORT),
    ("remote_addr", KEY_REMOTE_ADDR),
    ("remote_port", KEY_REMOTE_PORT),
    ("path", KEY_PATH),
    ("host", KEY_HOST),
    ("mode", KEY_MODE),
    ("mux", KEY_MUX),
    ("server", KEY_SERVER),
    ("loglevel", KEY_LOG_LEVEL),
];

/// Rewrite single-dash long flags (`-localAddr`) to the double-dash form
fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let command = Args::command();
    let longs: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .chain(["help", "version"])
        .collect();

    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 {
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest)
                    if !rest.starts_with('-')
                        && longs.contains(&rest.split('=').next().unwrap_or(rest)) =>
                {
                    format!("-{}", arg)
                }
                _ => arg,
            }
        })
        .collect()
}

fn explicit_flags(matches: &ArgMatches) -> Vec<&'static str> {
    FLAG_KEYS
        .iter()
        .filter(|(id, _)| matches.value_source(id) == Some(ValueSource::CommandLine))
        .map(|(_, key)| *key)
        .collect()
}

impl Args {
    fn flag_values(&self, explicit: Vec<&'static str>) -> FlagValues {
        FlagValues {
            local_addr: self.local_addr.clone(),
            local_port: self.local_port.clone(),
            remote_addr: self.remote_addr.clone(),
            remote_port: self.remote_port.clone(),
            path: self.path.clone(),
            host: self.host.clone(),
            mode: self.mode.clone(),
            mux: self.mux,
            server: self.server,
            log_level: self.loglevel.clone(),
            explicit,
        }
    }
}

fn fail(context: &str, err: impl Into<AdapterError>) -> ! {
    let err = err.into();
    error!("{}: {}", context, err);
    process::exit(err.exit_code());
}

#[cfg(unix)]
async fn term_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn term_signal() {
    std::future::pending::<()>().await;
}

async fn wait_for_signal() {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
        () = term_signal() => {}
    }
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let argv = normalize_args(
        std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()),
    );
    let matches = Args::command().get_matches_from(argv);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let flags = args.flag_values(explicit_flags(&matches));

    let builder = ConfigBuilder::new(flags)
        .with_capability(args.capability)
        .with_env();

    init_logger(builder.log_level());
    info!("Starting {} v{}", APP_NAME, VERSION);

    let params = builder
        .build()
        .unwrap_or_else(|e| fail("Invalid configuration", e));
    if params.managed_network() {
        info!("Running on a host-managed network");
    }

    let config = synth::synthesize(&params)
        .unwrap_or_else(|e| fail("Failed to synthesize configuration", e));

    if args.print_config {
        match serde_json::to_string_pretty(&document::render(&config)) {
            Ok(doc) => println!("{}", doc),
            Err(e) => fail("Failed to render configuration", e),
        }
        return;
    }

    let engine_args = if args.engine_args.is_empty() {
        ENGINE_ARGS.iter().map(|s| s.to_string()).collect()
    } else {
        args.engine_args.clone()
    };
    let mut engine = ProcessEngine::new(args.engine.clone(), engine_args);

    if let Err(e) = engine.start(&config).await {
        fail("Failed to start engine", e);
    }

    info!("Plugin ready, press Ctrl+C to stop");

    let exited = tokio::select! {
        () = wait_for_signal() => None,
        result = engine.wait() => Some(result),
    };

    match exited {
        None => {
            info!("Shutting down");
            // Failures are already logged by the engine.
            let _ = engine.close().await;
        }
        Some(Ok(())) => {
            warn!("Engine exited unexpectedly");
            process::exit(EXIT_ENGINE_ERROR);
        }
        Some(Err(e)) => fail("Engine stopped", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("sip003-adapter")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_single_dash_long_flags() {
        let args = normalize_args(argv(&["-localAddr", "0.0.0.0", "-mux=0", "-server", "-version"]));
        assert_eq!(
            args,
            argv(&["--localAddr", "0.0.0.0", "--mux=0", "--server", "--version"])
        );
    }

    #[test]
    fn test_other_arguments_untouched() {
        let original = argv(&["--path", "/ws", "-V", "--engine-arg", "-config", "--mux", "0"]);
        assert_eq!(normalize_args(original.clone()), original);
    }

    #[test]
    fn test_go_style_command_line_parses() {
        let matches = Args::command()
            .try_get_matches_from(normalize_args(argv(&["-localPort", "2000", "-mux", "4"])))
            .unwrap();
        let args = Args::from_arg_matches(&matches).unwrap();
        assert_eq!(args.local_port, "2000");
        assert_eq!(args.mux, 4);
        assert_eq!(explicit_flags(&matches), vec![KEY_LOCAL_PORT, KEY_MUX]);
    }
}
