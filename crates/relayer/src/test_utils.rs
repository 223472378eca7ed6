use alloc::sync::Arc;
use std::thread;

use crossbeam_channel as channel;

use crate::bridge::{channel_transport, Bridge, Outbound, Port, ReplyTable};

/// The answer a test controller gives to a call.
#[derive(Clone, Debug)]
pub struct ControllerReply {
    pub is_error: bool,
    pub payload: String,
}

impl ControllerReply {
    pub fn ok(payload: &str) -> Self {
        Self {
            is_error: false,
            payload: payload.to_string(),
        }
    }

    pub fn err(payload: &str) -> Self {
        Self {
            is_error: true,
            payload: payload.to_string(),
        }
    }
}

/// Answers every call arriving on `outbound` that asks for a reply, on a
/// background thread, until all senders are gone.
///
/// The payload of each answered call is forwarded on the returned channel.
pub fn serve_controller<D, F>(
    outbound: channel::Receiver<Outbound>,
    deliver: D,
    answer: F,
) -> channel::Receiver<String>
where
    D: Fn(Port, bool, String) -> bool + Send + 'static,
    F: Fn(&str) -> ControllerReply + Send + 'static,
{
    let (seen_tx, seen_rx) = channel::unbounded();

    thread::spawn(move || {
        for call in outbound.iter() {
            let Some(port) = call.port else { continue };

            let _ = seen_tx.send(call.payload.clone());

            let reply = answer(&call.payload);
            deliver(port, reply.is_error, reply.payload);
        }
    });

    seen_rx
}

/// A bridge whose controller answers with `answer`.
pub fn spawn_controller<F>(answer: F) -> (Bridge, channel::Receiver<String>)
where
    F: Fn(&str) -> ControllerReply + Send + 'static,
{
    let replies = Arc::new(ReplyTable::new());
    let (transport, outbound) = channel_transport();

    let seen = {
        let replies = replies.clone();
        serve_controller(
            outbound,
            move |port, is_error, payload| replies.deliver(port, is_error, payload),
            answer,
        )
    };

    (Bridge::new(replies, Arc::new(transport)), seen)
}
