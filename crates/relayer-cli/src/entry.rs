//! Definition of the entrypoint for the relayer bridge CLI.

use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;

use ibc_relayer_bridge::config;

use crate::commands::CliCmd;
use crate::components::init_tracing;

/// Entry point for the relayer bridge CLI.
#[derive(Debug, Parser)]
#[clap(author, about, version)]
pub struct EntryPoint {
    /// Path to the configuration file
    #[clap(long = "config", help = "Path to configuration file", default_value = "config.toml")]
    pub config: PathBuf,

    /// Emit logs as JSON
    #[clap(long = "json", help = "Enable JSON output")]
    pub json: bool,

    /// Subcommand to execute.
    #[clap(subcommand)]
    pub command: CliCmd,
}

impl EntryPoint {
    pub fn run(&self) -> eyre::Result<()> {
        let config = config::load(&self.config).wrap_err_with(|| {
            format!("failed to load configuration from {}", self.config.display())
        })?;

        init_tracing(&config.global, self.json)?;

        self.command.run(&config)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use test_log::test;

    use super::EntryPoint;
    use crate::commands::CliCmd;

    #[test]
    fn global_options_precede_the_subcommand() {
        let entry = EntryPoint::parse_from([
            "relayer-bridge",
            "--config",
            "bridge.toml",
            "--json",
            "start",
            "--batches",
            "batches.json",
        ]);

        assert_eq!(entry.config, PathBuf::from("bridge.toml"));
        assert!(entry.json);
        assert!(matches!(entry.command, CliCmd::Start(_)));
    }

    #[test]
    fn config_defaults_to_working_directory() {
        let entry = EntryPoint::parse_from(["relayer-bridge", "validate"]);

        assert_eq!(entry.config, PathBuf::from("config.toml"));
        assert!(matches!(entry.command, CliCmd::Validate(_)));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(EntryPoint::try_parse_from(["relayer-bridge"]).is_err());
    }
}
