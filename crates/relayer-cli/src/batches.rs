//! The batches file read by `relayer-bridge start`.
//!
//! A JSON list of batches, each naming its source and destination chains by
//! their configured identifier:
//!
//! ```json
//! [
//!   {
//!     "src": "ibc-0",
//!     "dst": "ibc-1",
//!     "src_msgs": [{ "msg": "...", "type": "MsgUpdateClient" }],
//!     "dst_msgs": [{ "msg": "...", "type": "MsgPacket" }],
//!     "last": true
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;

use eyre::{eyre, WrapErr};
use serde_derive::{Deserialize, Serialize};

use ibc_relayer_bridge::config::Config;
use ibc_relayer_bridge::link::RelayMsgs;
use ibc_relayer_bridge::msgs::{unmarshal_msgs, DeliverMsg};
use ibc_relayer_bridge::path_end::PathEnd;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchSpec {
    pub src: String,
    pub dst: String,
    #[serde(default)]
    pub src_msgs: Vec<DeliverMsg>,
    #[serde(default)]
    pub dst_msgs: Vec<DeliverMsg>,
    #[serde(default)]
    pub last: bool,
}

impl BatchSpec {
    pub fn relay_msgs(&self) -> RelayMsgs {
        RelayMsgs::new(
            unmarshal_msgs(self.src_msgs.clone()),
            unmarshal_msgs(self.dst_msgs.clone()),
        )
        .with_last(self.last)
    }

    /// The path ends of the source and destination chains, as configured.
    pub fn path_ends(&self, config: &Config) -> eyre::Result<(PathEnd, PathEnd)> {
        let find = |id: &str| {
            config
                .find_chain(id)
                .map(|chain| chain.path_end())
                .ok_or_else(|| eyre!("chain '{}' not found in configuration", id))
        };

        Ok((find(&self.src)?, find(&self.dst)?))
    }
}

pub fn parse(batches: &str) -> eyre::Result<Vec<BatchSpec>> {
    Ok(serde_json::from_str(batches)?)
}

pub fn load(path: &Path) -> eyre::Result<Vec<BatchSpec>> {
    let batches = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read batches file {}", path.display()))?;

    parse(&batches).wrap_err_with(|| format!("invalid batches file {}", path.display()))
}
