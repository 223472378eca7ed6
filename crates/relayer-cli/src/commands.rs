//! Relayer bridge subcommands

use clap::Subcommand;
use ibc_relayer_bridge::config::Config;

mod start;
mod validate;

pub use start::StartCmd;
pub use validate::ValidateCmd;

#[derive(Debug, Subcommand)]
pub enum CliCmd {
    /// Start a relay session delivering the batches of a file
    Start(StartCmd),

    /// Validate the configuration file
    Validate(ValidateCmd),
}

impl CliCmd {
    pub fn run(&self, config: &Config) -> eyre::Result<()> {
        match self {
            CliCmd::Start(cmd) => cmd.run(config),
            CliCmd::Validate(cmd) => cmd.run(config),
        }
    }
}
