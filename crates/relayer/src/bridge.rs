//! Blocking call/reply bridge between the relayer and an external controller.
//!
//! The controller can only answer out-of-band: a call is forwarded through a
//! [`ControllerTransport`] tagged with a fresh [`Port`], and the caller's
//! thread is parked until someone hands the matching reply to
//! [`ReplyTable::deliver`]. Nothing times out: a call whose reply never
//! arrives keeps its thread blocked.

pub mod transport;

use alloc::sync::Arc;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::Mutex;

use crossbeam_channel as channel;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::util::lock::LockExt;

pub use transport::{channel_transport, ChannelTransport, ControllerTransport, Outbound};

/// Returned by [`Bridge::initiate`] when the caller did not ask for a reply.
pub const NO_REPLY_REQUESTED: &str = "<no-reply-requested>";

/// Correlation id of one outstanding call awaiting a controller reply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u64);

impl Port {
    pub fn new(port: u64) -> Self {
        Self(port)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for Port {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "port-{}", self.0)
    }
}

/// What a controller reply resolves to: its payload, or the error it carried.
pub type ReplyOutcome = Result<String, Error>;

type ReplyTo = channel::Sender<ReplyOutcome>;
type Reply = channel::Receiver<ReplyOutcome>;

fn reply_channel() -> (ReplyTo, Reply) {
    channel::bounded(1)
}

/// The pending reply slots of every outstanding call, keyed by port.
///
/// A slot is removed from the table in the same critical section that hands
/// its outcome over, so each port is answered at most once.
#[derive(Debug)]
pub struct ReplyTable {
    next_port: AtomicU64,
    pending: Mutex<HashMap<Port, ReplyTo>>,
}

impl Default for ReplyTable {
    fn default() -> Self {
        Self {
            next_port: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl ReplyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls still waiting for a reply.
    pub fn pending(&self) -> usize {
        self.pending.acquire().len()
    }

    fn register(&self) -> (Port, Reply) {
        let port = Port(self.next_port.fetch_add(1, Ordering::SeqCst));
        let (reply_to, reply) = reply_channel();

        self.pending.acquire().insert(port, reply_to);

        (port, reply)
    }

    fn forget(&self, port: Port) {
        self.pending.acquire().remove(&port);
    }

    /// Hands the controller's reply for `port` to the waiting caller.
    ///
    /// Returns `false` if no call is waiting on `port`, which covers
    /// duplicate, late and unsolicited replies alike.
    pub fn deliver(&self, port: Port, is_error: bool, payload: String) -> bool {
        let Some(reply_to) = self.pending.acquire().remove(&port) else {
            debug!(%port, "dropping reply for a port nobody is waiting on");
            return false;
        };

        let outcome = if is_error {
            Err(Error::transport(payload))
        } else {
            Ok(payload)
        };

        // The slot holds the only sender and has room for exactly one reply.
        if reply_to.send(outcome).is_err() {
            warn!(%port, "caller stopped waiting before its reply arrived");
        }

        true
    }
}

/// One session's end of the bridge: a shared reply table plus the transport
/// that carries calls to the controller.
#[derive(Clone)]
pub struct Bridge {
    replies: Arc<ReplyTable>,
    transport: Arc<dyn ControllerTransport>,
}

impl Bridge {
    pub fn new(replies: Arc<ReplyTable>, transport: Arc<dyn ControllerTransport>) -> Self {
        Self { replies, transport }
    }

    pub fn replies(&self) -> &Arc<ReplyTable> {
        &self.replies
    }

    /// Sends `payload` to the controller.
    ///
    /// Without `needs_reply` this is a notification: it returns
    /// [`NO_REPLY_REQUESTED`] right away. Otherwise the calling thread blocks
    /// until [`ReplyTable::deliver`] is called for the port allocated here.
    pub fn initiate(&self, payload: &str, needs_reply: bool) -> ReplyOutcome {
        if !needs_reply {
            if let Err(e) = self.transport.send(None, payload.to_string()) {
                warn!("failed to notify controller: {}", e);
            }

            return Ok(NO_REPLY_REQUESTED.to_string());
        }

        let (port, reply) = self.replies.register();
        trace!(%port, "calling controller");

        if let Err(e) = self.transport.send(Some(port), payload.to_string()) {
            self.replies.forget(port);
            return Err(e);
        }

        let outcome = reply.recv().map_err(Error::channel_receive)?;
        trace!(%port, ok = outcome.is_ok(), "controller replied");

        outcome
    }

    pub fn deliver_reply(&self, port: Port, is_error: bool, payload: String) -> bool {
        self.replies.deliver(port, is_error, payload)
    }
}

impl core::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_struct("Bridge")
            .field("pending", &self.replies.pending())
            .finish()
    }
}
