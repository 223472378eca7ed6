use crossbeam_channel as channel;

use crate::bridge::Port;
use crate::error::Error;

/// Carries calls from the relayer to the controller.
///
/// `port` is `None` for notifications that expect no reply; otherwise the
/// controller must eventually answer by delivering a reply for that port.
pub trait ControllerTransport: Send + Sync {
    fn send(&self, port: Option<Port>, payload: String) -> Result<(), Error>;
}

/// A call as seen by the controller side of a [`ChannelTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outbound {
    pub port: Option<Port>,
    pub payload: String,
}

/// In-process transport that queues calls on a channel for the host to drain.
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    sender: channel::Sender<Outbound>,
}

impl ChannelTransport {
    pub fn new(sender: channel::Sender<Outbound>) -> Self {
        Self { sender }
    }
}

impl ControllerTransport for ChannelTransport {
    fn send(&self, port: Option<Port>, payload: String) -> Result<(), Error> {
        self.sender
            .send(Outbound { port, payload })
            .map_err(Error::send)
    }
}

pub fn channel_transport() -> (ChannelTransport, channel::Receiver<Outbound>) {
    let (sender, receiver) = channel::unbounded();
    (ChannelTransport::new(sender), receiver)
}
