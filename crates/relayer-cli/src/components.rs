//! Tracing setup for the relayer bridge.

use eyre::eyre;
use ibc_relayer_bridge::config::{GlobalConfig, LogLevel};
use itertools::Itertools;
use tracing_subscriber::{filter::EnvFilter, util::SubscriberInitExt, FmtSubscriber};

/// The name of the environment variable through which one can override
/// the tracing filter built in [`build_tracing_filter`].
const RELAYER_LOG_VAR: &str = "RUST_LOG";

/// The relayer crates targeted by the default log level.
const TARGET_CRATES: [&str; 2] = ["ibc_relayer_bridge", "ibc_relayer_bridge_cli"];

/// Installs the global tracing subscriber.
///
/// Logs always go to stderr: stdout carries the controller protocol.
/// With `json`, every event is emitted as one JSON object per line, without colors.
pub fn init_tracing(cfg: &GlobalConfig, json: bool) -> eyre::Result<()> {
    let filter = build_tracing_filter(cfg.log_level)?;

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(true);

    let result = if json {
        // Note: JSON formatter is un-affected by ANSI 'color' option. Set to 'false'.
        builder.with_ansi(false).json().finish().try_init()
    } else {
        builder.with_ansi(enable_ansi()).finish().try_init()
    };

    result.map_err(|e| eyre!("failed to install tracing subscriber: {e}"))
}

/// Check if both stdout and stderr are proper terminal (tty),
/// so that we know whether or not to enable colored output,
/// using ANSI escape codes.
pub fn enable_ansi() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Build a tracing directive setting the log level for the relayer crates to the
/// given `log_level`.
pub fn default_directive(log_level: LogLevel) -> String {
    TARGET_CRATES
        .iter()
        .map(|&c| format!("{c}={log_level}"))
        .join(",")
}

/// Builds a tracing filter based on the input `log_level`, unless overridden
/// through `RUST_LOG`. Enables tracing exclusively for the relayer crates.
fn build_tracing_filter(default_level: LogLevel) -> eyre::Result<EnvFilter> {
    let directive =
        std::env::var(RELAYER_LOG_VAR).unwrap_or_else(|_| default_directive(default_level));

    EnvFilter::try_new(&directive)
        .map_err(|e| eyre!("invalid log filtering directive {directive:?}: {e}"))
}
