//! Main entry point for the relayer bridge CLI

#![deny(warnings, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use clap::Parser;

use ibc_relayer_bridge_cli::components::enable_ansi;
use ibc_relayer_bridge_cli::entry::EntryPoint;

fn main() -> eyre::Result<()> {
    install_error_reporter()?;

    EntryPoint::parse().run()
}

fn install_error_reporter() -> eyre::Result<()> {
    if backtrace_enabled() && enable_ansi() {
        // If backtraces are enabled and we are in a terminal
        // supporting color, display full error logs in color.
        color_eyre::install()
    } else {
        // Otherwise use the default error report handler, which displays
        // multiline errors without color.
        Ok(())
    }
}

fn backtrace_enabled() -> bool {
    match std::env::var("RUST_BACKTRACE").as_deref() {
        Ok("" | "0") | Err(_) => false,
        Ok(_) => true,
    }
}
