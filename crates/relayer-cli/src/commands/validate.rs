//! `validate` subcommand

use std::io::{self, Write};

use clap::Parser;
use tracing::info;

use ibc_relayer_bridge::config::{self, Config};

/// Validate the configuration file
#[derive(Clone, Debug, Default, Parser, PartialEq, Eq)]
pub struct ValidateCmd {
    #[clap(
        long = "show",
        help = "Print the effective configuration, with defaults filled in"
    )]
    show: bool,
}

impl ValidateCmd {
    pub fn run(&self, config: &Config) -> eyre::Result<()> {
        self.validate(config, io::stdout().lock())
    }

    fn validate(&self, config: &Config, mut out: impl Write) -> eyre::Result<()> {
        config.validate()?;

        info!("configuration is valid, {} chain(s) configured", config.chains.len());

        if self.show {
            config::store_writer(config, out)?;
        } else {
            writeln!(out, "configuration is valid")?;
        }

        Ok(())
    }
}
