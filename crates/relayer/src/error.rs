//! This module defines the various errors that be raised in the relayer bridge.

use flex_error::{define_error, TraceError};

use crate::host::SessionId;
use crate::path_end::PathEnd;

define_error! {
    Error {
        Transport
            { reason: String }
            |e| { format!("controller replied with an error: {}", e.reason) },

        ChannelSend
            |_| { "internal message-passing failure while forwarding a call to the controller" },

        ChannelReceive
            [ TraceError<crossbeam_channel::RecvError> ]
            |_| { "internal message-passing failure while waiting for a controller reply" },

        ControllerIo
            [ TraceError<std::io::Error> ]
            |_| { "I/O error on the channel to the controller" },

        EncodeAction
            [ TraceError<serde_json::Error> ]
            |_| { "failed to encode relayer action" },

        DecodeAction
            [ TraceError<serde_json::Error> ]
            |_| { "failed to decode relayer action" },

        UnknownEndpoint
            { path_end: PathEnd }
            |e| { format!("no chain registered for endpoint {}", e.path_end) },

        UnknownSession
            { session: SessionId }
            |e| { format!("no session with id {}", e.session) },

        Panicked
            { session: SessionId }
            |e| { format!("relay loop of {} panicked", e.session) },

        Spawn
            [ TraceError<std::io::Error> ]
            |_| { "failed to spawn a relayer thread" },

        Submission
            {
                chain_id: String,
                reason: String,
            }
            |e| {
                format!("failed to submit messages to chain {}: {}",
                    e.chain_id, e.reason)
            },
    }
}

impl Error {
    pub fn send<T>(_: crossbeam_channel::SendError<T>) -> Error {
        Error::channel_send()
    }

    /// Whether this error originates from a reply the controller explicitly
    /// tagged as an error, as opposed to a local message-passing failure.
    pub fn is_controller_rejection(&self) -> bool {
        matches!(self.detail(), ErrorDetail::Transport(_))
    }
}
