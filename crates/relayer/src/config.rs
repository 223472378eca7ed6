//! Relayer bridge configuration

pub mod error;

use core::fmt::{Display, Error as FmtError, Formatter};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::path_end::PathEnd;

pub use error::Error;

pub mod default {
    pub fn exit_on_completion() -> bool {
        false
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub chains: Vec<ChainConfig>,
}

impl Config {
    pub fn find_chain(&self, id: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.id == id)
    }

    /// Checks that every chain has a non-empty, unique identifier.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();

        for chain in &self.chains {
            if chain.id.is_empty() {
                return Err(Error::empty_chain_id());
            }

            if !seen.insert(chain.id.as_str()) {
                return Err(Error::duplicate_chain(chain.id.clone()));
            }
        }

        Ok(())
    }
}

/// Log levels are wrappers over [`tracing::Level`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    /// Terminate the whole process once a session's relay loop returns.
    #[serde(default = "default::exit_on_completion")]
    pub exit_on_completion: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            exit_on_completion: default::exit_on_completion(),
        }
    }
}

/// One chain endpoint known to the relayer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub connection_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub port_id: String,
    #[serde(default)]
    pub order: String,
}

impl ChainConfig {
    pub fn path_end(&self) -> PathEnd {
        PathEnd {
            chain_id: self.id.clone(),
            client_id: self.client_id.clone(),
            connection_id: self.connection_id.clone(),
            channel_id: self.channel_id.clone(),
            port_id: self.port_id.clone(),
            order: self.order.clone(),
        }
    }
}

/// Attempt to load and parse the TOML config file as a `Config`.
pub fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let config_toml = fs::read_to_string(&path).map_err(Error::io)?;

    let config = toml::from_str::<Config>(&config_toml[..]).map_err(Error::decode)?;

    Ok(config)
}

/// Serialize the given `Config` as TOML to the given writer.
pub fn store_writer(config: &Config, mut writer: impl Write) -> Result<(), Error> {
    let toml_config = toml::to_string_pretty(&config).map_err(Error::encode)?;

    writeln!(writer, "{toml_config}").map_err(Error::io)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load, store_writer, ChainConfig, Config, LogLevel};
    use crate::path_end::{Order, PathEnd};
    use test_log::test;

    #[test]
    fn parse_valid_config() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/config/fixtures/relayer_bridge_conf_example.toml"
        );

        let config = load(path).expect("could not parse config");

        assert_eq!(config.global.log_level, LogLevel::Debug);
        assert!(!config.mode.exit_on_completion);
        assert_eq!(config.chains.len(), 2);
        assert!(config.validate().is_ok());

        let chain = config.find_chain("ibc-0").unwrap();
        assert_eq!(
            chain.path_end(),
            PathEnd::new("ibc-0")
                .with_client("07-tendermint-0")
                .with_connection("connection-0")
                .with_channel("transfer", "channel-0")
                .with_order("UNORDERED")
        );
        assert_eq!(chain.path_end().order(), Order::Unordered);
    }

    #[test]
    fn parse_invalid_config() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/config/fixtures/relayer_bridge_conf_invalid.toml"
        );

        assert!(load(path).is_err());
    }

    #[test]
    fn serialize_valid_config() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/config/fixtures/relayer_bridge_conf_example.toml"
        );

        let config = load(path).expect("could not parse config");

        let mut buffer = Vec::new();
        store_writer(&config, &mut buffer).unwrap();

        let reparsed: Config = toml::from_str(&String::from_utf8(buffer).unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.global.log_level, LogLevel::Info);
        assert!(!config.mode.exit_on_completion);
        assert!(config.chains.is_empty());
    }

    #[test]
    fn duplicate_chain_ids_are_rejected() {
        let chain = ChainConfig {
            id: "ibc-0".to_string(),
            ..Default::default()
        };
        let config = Config {
            chains: vec![chain.clone(), chain],
            ..Default::default()
        };

        assert!(config.validate().is_err());
        assert!(Config {
            chains: vec![ChainConfig::default()],
            ..Default::default()
        }
        .validate()
        .is_err());
    }
}
