use core::fmt::Debug;

use serde_derive::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Error;
use crate::msgs::RelayMsg;
use crate::path_end::PathEnd;
use crate::util::pretty::{PrettyMsgs, PrettyTx};

/// Result of broadcasting a transaction, as reported by the chain.
///
/// A zero `code` means the chain accepted the transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub height: u64,
    pub hash: String,
    pub code: u32,
    #[serde(default)]
    pub log: String,
}

impl TxResponse {
    pub fn is_accepted(&self) -> bool {
        self.code == 0
    }
}

/// A live handle to one chain endpoint.
///
/// Signing, broadcasting and the chain RPC client all live behind
/// [`ChainHandle::send_msgs`]. Handles are cheap to clone and may be shared
/// between relay rounds running on different threads.
pub trait ChainHandle: Clone + Debug + Send + Sync + 'static {
    /// The descriptor of the relay path end this handle is configured for.
    fn path_end(&self) -> PathEnd;

    fn id(&self) -> String {
        self.path_end().chain_id
    }

    /// Submits `msgs` in a single transaction.
    fn send_msgs(&self, msgs: &[RelayMsg]) -> Result<TxResponse, Error>;

    fn log_success_tx(&self, tx: &TxResponse, msgs: &[RelayMsg]) {
        info!(
            chain.id = %self.id(),
            "submitted {} message(s) [{}]: {}",
            msgs.len(),
            PrettyMsgs(msgs),
            PrettyTx(tx)
        );
    }

    /// Reports a submission that errored or that the chain rejected.
    fn log_failed_tx(&self, outcome: &Result<TxResponse, Error>, msgs: &[RelayMsg]) {
        match outcome {
            Ok(tx) => error!(
                chain.id = %self.id(),
                "chain rejected {} message(s) [{}]: {}",
                msgs.len(),
                PrettyMsgs(msgs),
                PrettyTx(tx)
            ),
            Err(e) => error!(
                chain.id = %self.id(),
                "failed to send {} message(s) [{}]: {}",
                msgs.len(),
                PrettyMsgs(msgs),
                e
            ),
        }
    }
}
