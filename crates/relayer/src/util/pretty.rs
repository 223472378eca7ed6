use core::fmt::{Display, Error as FmtError, Formatter};

use itertools::Itertools;

use crate::chain::handle::TxResponse;
use crate::msgs::RelayMsg;

/// Lists the kinds of a batch of messages with their position,
/// eg. `0:MsgUpdateClient,1:MsgPacket`.
pub struct PrettyMsgs<'a>(pub &'a [RelayMsg]);

impl Display for PrettyMsgs<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let kinds = self
            .0
            .iter()
            .enumerate()
            .map(|(i, msg)| format!("{}:{}", i, msg.kind))
            .join(",");

        f.write_str(&kinds)
    }
}

/// Renders a transaction response on one line.
pub struct PrettyTx<'a>(pub &'a TxResponse);

impl Display for PrettyTx<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let tx = self.0;

        write!(f, "height={} hash={} code={}", tx.height, tx.hash, tx.code)?;

        if !tx.log.is_empty() {
            write!(f, " log={:?}", tx.log)?;
        }

        Ok(())
    }
}
