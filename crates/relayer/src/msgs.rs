//! Relay messages and their wire representation.
//!
//! Message construction happens outside this crate; here a message is an
//! already-encoded payload tagged with the kind of IBC message it carries.

use core::convert::Infallible;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde_derive::{Deserialize, Serialize};
use tracing::warn;

/// The kind of IBC message a [`RelayMsg`] carries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MsgKind {
    UpdateClient,
    CreateClient,
    ConnectionOpenInit,
    ConnectionOpenTry,
    ConnectionOpenAck,
    ConnectionOpenConfirm,
    ChannelOpenInit,
    ChannelOpenTry,
    ChannelOpenAck,
    ChannelOpenConfirm,
    ChannelCloseInit,
    ChannelCloseConfirm,
    Packet,
    Timeout,
    Acknowledgement,
    /// A kind tag this relayer does not know. The message is still relayed as is.
    Unrecognized(String),
}

impl MsgKind {
    pub const ALL: [MsgKind; 15] = [
        Self::UpdateClient,
        Self::CreateClient,
        Self::ConnectionOpenInit,
        Self::ConnectionOpenTry,
        Self::ConnectionOpenAck,
        Self::ConnectionOpenConfirm,
        Self::ChannelOpenInit,
        Self::ChannelOpenTry,
        Self::ChannelOpenAck,
        Self::ChannelOpenConfirm,
        Self::ChannelCloseInit,
        Self::ChannelCloseConfirm,
        Self::Packet,
        Self::Timeout,
        Self::Acknowledgement,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::UpdateClient => "MsgUpdateClient",
            Self::CreateClient => "MsgCreateClient",
            Self::ConnectionOpenInit => "MsgConnectionOpenInit",
            Self::ConnectionOpenTry => "MsgConnectionOpenTry",
            Self::ConnectionOpenAck => "MsgConnectionOpenAck",
            Self::ConnectionOpenConfirm => "MsgConnectionOpenConfirm",
            Self::ChannelOpenInit => "MsgChannelOpenInit",
            Self::ChannelOpenTry => "MsgChannelOpenTry",
            Self::ChannelOpenAck => "MsgChannelOpenAck",
            Self::ChannelOpenConfirm => "MsgChannelOpenConfirm",
            Self::ChannelCloseInit => "MsgChannelCloseInit",
            Self::ChannelCloseConfirm => "MsgChannelCloseConfirm",
            Self::Packet => "MsgPacket",
            Self::Timeout => "MsgTimeout",
            Self::Acknowledgement => "MsgAcknowledgement",
            Self::Unrecognized(kind) => kind,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl Display for MsgKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.as_str())
    }
}

impl FromStr for MsgKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = Self::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Unrecognized(s.to_string()));

        Ok(kind)
    }
}

/// An encoded message, ready to be submitted to a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayMsg {
    pub kind: MsgKind,
    pub value: String,
}

impl RelayMsg {
    pub fn new(kind: MsgKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Wire form of a [`RelayMsg`], as exchanged with the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverMsg {
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&RelayMsg> for DeliverMsg {
    fn from(msg: &RelayMsg) -> Self {
        Self {
            msg: msg.value.clone(),
            kind: msg.kind.as_str().to_string(),
        }
    }
}

impl From<DeliverMsg> for RelayMsg {
    fn from(msg: DeliverMsg) -> Self {
        let kind = match msg.kind.parse::<MsgKind>() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };

        RelayMsg::new(kind, msg.msg)
    }
}

pub fn marshal_msgs(msgs: &[RelayMsg]) -> Vec<DeliverMsg> {
    msgs.iter().map(DeliverMsg::from).collect()
}

/// Decodes wire messages, preserving their order.
///
/// Messages of an unrecognized kind are kept, and reported.
pub fn unmarshal_msgs(msgs: Vec<DeliverMsg>) -> Vec<RelayMsg> {
    msgs.into_iter()
        .map(RelayMsg::from)
        .inspect(|msg| {
            if !msg.kind.is_recognized() {
                warn!(msg.kind = %msg.kind, "message type not handled by the relayer, relaying it as is");
            }
        })
        .collect()
}
