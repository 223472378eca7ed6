//! Actions exchanged with the controller.

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::msgs::DeliverMsg;
use crate::path_end::PathEnd;

/// Tag of the action asking for a relay batch to be delivered.
pub const RELAYER_SEND: &str = "RELAYER_SEND";

/// A request exchanged with the controller, discriminated by its `type` tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "RELAYER_SEND")]
    RelayerSend(DeliverMsgsAction),
}

impl Action {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::RelayerSend(_) => RELAYER_SEND,
        }
    }

    pub fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::encode_action)
    }

    pub fn decode(payload: &str) -> Result<Self, Error> {
        serde_json::from_str(payload).map_err(Error::decode_action)
    }
}

/// The messages of one relay batch together with both endpoints they target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverMsgsAction {
    #[serde(default)]
    pub src: PathEnd,
    #[serde(default)]
    pub dst: PathEnd,
    #[serde(default)]
    pub src_msgs: Vec<DeliverMsg>,
    #[serde(default)]
    pub dst_msgs: Vec<DeliverMsg>,
    /// Set on the final batch of a relay sequence.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub last: bool,
}
