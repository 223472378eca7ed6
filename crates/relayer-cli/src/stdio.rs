//! The controller protocol over stdin and stdout.
//!
//! Every message is a single line of JSON. The relayer writes [`Outgoing`]
//! messages and reads [`Incoming`] ones:
//!
//! ```text
//! -> {"call":{"port":1,"payload":"{\"type\":\"RELAYER_SEND\",...}"}}
//! <- {"reply":{"port":1,"error":false,"payload":"true"}}
//! <- {"dispatch":{"session":1,"payload":"{\"type\":\"RELAYER_SEND\",...}"}}
//! -> {"dispatched":{"session":1,"result":"2"}}
//! ```

use alloc::sync::Arc;
use std::io::{BufRead, Write};
use std::sync::Mutex;

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use ibc_relayer_bridge::bridge::{ControllerTransport, Port};
use ibc_relayer_bridge::chain::handle::ChainHandle;
use ibc_relayer_bridge::error::Error;
use ibc_relayer_bridge::host::{Host, SessionId};
use ibc_relayer_bridge::util::lock::LockExt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outgoing {
    /// A call to the controller. Calls without a port expect no reply.
    Call { port: Option<Port>, payload: String },
    /// The result of a dispatch requested by the controller.
    Dispatched { session: SessionId, result: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Incoming {
    Reply {
        port: Port,
        #[serde(default)]
        error: bool,
        payload: String,
    },
    Dispatch {
        session: SessionId,
        payload: String,
    },
}

/// Writes [`Outgoing`] messages, one per line, from any number of threads.
pub struct LineWriter<W> {
    out: Arc<Mutex<W>>,
}

impl<W> Clone for LineWriter<W> {
    fn clone(&self) -> Self {
        Self {
            out: self.out.clone(),
        }
    }
}

impl<W: Write> LineWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn write(&self, msg: &Outgoing) -> Result<(), Error> {
        let line = serde_json::to_string(msg).map_err(Error::encode_action)?;

        let mut out = self.out.acquire();
        writeln!(out, "{line}").map_err(Error::controller_io)?;
        out.flush().map_err(Error::controller_io)
    }
}

/// Forwards the relayer's calls to a controller reading our stdout.
pub struct StdioTransport<W> {
    writer: LineWriter<W>,
}

impl<W: Write> StdioTransport<W> {
    pub fn new(writer: LineWriter<W>) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> ControllerTransport for StdioTransport<W> {
    fn send(&self, port: Option<Port>, payload: String) -> Result<(), Error> {
        self.writer.write(&Outgoing::Call { port, payload })
    }
}

/// Reads the controller's messages from `input` until it is closed, handing
/// replies and dispatch requests to `host`.
///
/// Lines that cannot be parsed are logged and skipped. Returns the number of
/// calls still waiting for a reply when the input was closed; those stay
/// blocked.
pub fn serve<Handle, R, W>(
    host: &Host<Handle>,
    input: R,
    writer: &LineWriter<W>,
) -> Result<usize, Error>
where
    Handle: ChainHandle,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line.map_err(Error::controller_io)?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        let incoming = match serde_json::from_str::<Incoming>(line) {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!("skipping malformed message from controller: {}", e);
                continue;
            }
        };

        match incoming {
            Incoming::Reply {
                port,
                error,
                payload,
            } => {
                if !host.deliver_reply(port, error, payload) {
                    warn!(%port, "controller replied on a port nobody is waiting on");
                }
            }
            Incoming::Dispatch { session, payload } => {
                let result = host.dispatch(session, &payload);
                debug!(%session, "dispatch result: {}", result);

                writer.write(&Outgoing::Dispatched { session, result })?;
            }
        }
    }

    let unanswered = host.replies().pending();

    if unanswered > 0 {
        warn!(
            "controller closed its input with {} call(s) unanswered",
            unanswered
        );
    } else {
        debug!("controller closed its input");
    }

    Ok(unanswered)
}
