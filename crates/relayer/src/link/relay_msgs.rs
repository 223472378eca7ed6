use core::fmt::{Display, Error as FmtError, Formatter};

use crate::msgs::RelayMsg;
use crate::util::pretty::PrettyMsgs;

/// The messages one relay round produced for the source and destination chains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayMsgs {
    pub src: Vec<RelayMsg>,
    pub dst: Vec<RelayMsg>,
    /// Marks the final batch of a relay sequence.
    pub last: bool,
    succeeded: bool,
}

impl RelayMsgs {
    pub fn new(src: Vec<RelayMsg>, dst: Vec<RelayMsg>) -> Self {
        Self {
            src,
            dst,
            last: false,
            succeeded: false,
        }
    }

    pub fn with_last(mut self, last: bool) -> Self {
        self.last = last;
        self
    }

    /// Returns true if there are messages to relay.
    pub fn ready(&self) -> bool {
        !self.src.is_empty() || !self.dst.is_empty()
    }

    /// Whether the last delivery attempt of this batch succeeded.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Total number of messages on both sides.
    pub fn len(&self) -> usize {
        self.src.len() + self.dst.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.ready()
    }

    pub(crate) fn conclude(&mut self, succeeded: bool) -> bool {
        self.succeeded = succeeded;
        succeeded
    }
}

impl Display for RelayMsgs {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "src: [{}]; dst: [{}]",
            PrettyMsgs(&self.src),
            PrettyMsgs(&self.dst)
        )
    }
}
