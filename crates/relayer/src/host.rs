//! The boundary between the relayer and the process embedding it.
//!
//! A [`Host`] owns the state shared by every session: the table of calls
//! waiting on the controller and the chain registry. The embedding process
//! drives it through three entry points:
//!
//! - [`Host::start`] spawns a session's relay loop,
//! - [`Host::deliver_reply`] answers a call the relayer made to the controller,
//! - [`Host::dispatch`] lets the controller ask the relayer to deliver a batch.
//!
//! The results of `dispatch` are plain strings so that the embedding side
//! never needs an error channel: [`DISPATCH_REJECTED`] when the request could
//! not be understood or names an unknown chain, [`DISPATCH_FAILED`] when the
//! delivery failed, and otherwise the number of messages delivered.

use alloc::sync::Arc;
use core::fmt::{Display, Error as FmtError, Formatter};
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::JoinHandle;

use serde_derive::{Deserialize, Serialize};
use tracing::{error, error_span, info, warn};

use crate::action::Action;
use crate::bridge::{Bridge, ControllerTransport, Port, ReplyTable};
use crate::chain::handle::ChainHandle;
use crate::config::ModeConfig;
use crate::controller::Controller;
use crate::error::Error;
use crate::link::{Link, RelayMsgs};
use crate::msgs::unmarshal_msgs;
use crate::path_end::PathEnd;
use crate::registry::ChainRegistry;
use crate::util::lock::LockExt;
use crate::util::task::spawn_task;

/// Returned by [`Host::dispatch`] when the action is malformed or names an
/// endpoint that is not registered.
pub const DISPATCH_REJECTED: &str = "false";

/// Returned by [`Host::dispatch`] when the batch was delivered but failed.
pub const DISPATCH_FAILED: &str = "0";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "session-{}", self.0)
    }
}

/// What a session's relay loop gets to work with.
pub struct SessionContext<Handle: ChainHandle> {
    pub id: SessionId,
    pub args: Vec<String>,
    controller: Option<Controller>,
    registry: Arc<ChainRegistry<Handle>>,
}

impl<Handle: ChainHandle> SessionContext<Handle> {
    /// The attached controller, or `None` when running standalone.
    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub fn registry(&self) -> &Arc<ChainRegistry<Handle>> {
        &self.registry
    }

    /// A link between `src` and `dst` whose batches go past this session's controller.
    pub fn link(&self, src: Handle, dst: Handle) -> Link<Handle> {
        Link::new(src, dst, self.registry.clone(), self.controller.clone())
    }
}

type SessionTask = JoinHandle<Result<(), Error>>;

struct Session {
    task: Option<SessionTask>,
}

pub struct Host<Handle: ChainHandle> {
    mode: ModeConfig,
    replies: Arc<ReplyTable>,
    registry: Arc<ChainRegistry<Handle>>,
    sessions: Mutex<HashMap<SessionId, Session>>,
    next_session: AtomicU64,
}

impl<Handle: ChainHandle> Host<Handle> {
    pub fn new(mode: ModeConfig) -> Self {
        Self {
            mode,
            replies: Arc::new(ReplyTable::new()),
            registry: Arc::new(ChainRegistry::new()),
            sessions: Mutex::new(HashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn registry(&self) -> &Arc<ChainRegistry<Handle>> {
        &self.registry
    }

    pub fn replies(&self) -> &Arc<ReplyTable> {
        &self.replies
    }

    /// Starts a session running `task` on its own thread and returns its id.
    ///
    /// With a `transport`, the session's links consult the controller on the
    /// other side of it before submitting anything. Without one the session
    /// runs standalone.
    ///
    /// If the host is configured to exit on completion, the whole process
    /// terminates as soon as `task` returns.
    pub fn start<F>(
        &self,
        args: Vec<String>,
        transport: Option<Arc<dyn ControllerTransport>>,
        task: F,
    ) -> Result<SessionId, Error>
    where
        F: FnOnce(SessionContext<Handle>) -> Result<(), Error> + Send + 'static,
    {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst));

        let controller = transport
            .map(|transport| Controller::new(Bridge::new(self.replies.clone(), transport)));

        info!(
            session = %id,
            controller = controller.is_some(),
            "starting session with args {:?}",
            args
        );

        let ctx = SessionContext {
            id,
            args,
            controller,
            registry: self.registry.clone(),
        };

        let exit_on_completion = self.mode.exit_on_completion;

        let task = spawn_task(
            format!("relay-loop:{}", id.value()),
            error_span!("session", id = %id),
            move || {
                let result = task(ctx);

                match &result {
                    Ok(()) => info!("relay loop finished"),
                    Err(e) => error!("relay loop failed: {}", e),
                }

                if exit_on_completion {
                    std::process::exit(if result.is_ok() { 0 } else { 1 });
                }

                result
            },
        )?;

        self.sessions
            .acquire()
            .insert(id, Session { task: Some(task) });

        Ok(id)
    }

    /// Blocks until the relay loop of `session` returns, and returns its result.
    pub fn wait(&self, session: SessionId) -> Result<(), Error> {
        let task = self
            .sessions
            .acquire()
            .get_mut(&session)
            .and_then(|s| s.task.take())
            .ok_or_else(|| Error::unknown_session(session))?;

        task.join().map_err(|_| Error::panicked(session))?
    }

    /// Hands the controller's reply to the call waiting on `port`.
    ///
    /// Returns `false` if nothing is waiting on `port`.
    pub fn deliver_reply(&self, port: Port, is_error: bool, payload: String) -> bool {
        self.replies.deliver(port, is_error, payload)
    }

    /// Handles an action sent by the controller to `session`.
    ///
    /// The batch is delivered directly to the chains: it already comes from
    /// the controller, so it is not offered back to it. `session` only tags
    /// the logs; the endpoints named by the action decide where it goes.
    pub fn dispatch(&self, session: SessionId, payload: &str) -> String {
        match self.try_dispatch(session, payload) {
            Ok(Some(delivered)) => delivered.to_string(),
            Ok(None) => DISPATCH_FAILED.to_string(),
            Err(e) => {
                warn!(%session, "rejecting dispatched action: {}", e);
                DISPATCH_REJECTED.to_string()
            }
        }
    }

    fn try_dispatch(&self, session: SessionId, payload: &str) -> Result<Option<usize>, Error> {
        if !self.sessions.acquire().contains_key(&session) {
            warn!(%session, "dispatch for a session this host did not start, delivering anyway");
        }

        let Action::RelayerSend(action) = Action::decode(payload)?;

        let src = self.resolve(&action.src)?;
        let dst = self.resolve(&action.dst)?;

        let mut batch = RelayMsgs::new(
            unmarshal_msgs(action.src_msgs),
            unmarshal_msgs(action.dst_msgs),
        )
        .with_last(action.last);

        let link = Link::new(src, dst, self.registry.clone(), None);

        if link.deliver(&mut batch) {
            Ok(Some(batch.len()))
        } else {
            Ok(None)
        }
    }

    fn resolve(&self, path_end: &PathEnd) -> Result<Handle, Error> {
        self.registry
            .resolve(path_end)
            .ok_or_else(|| Error::unknown_endpoint(path_end.clone()))
    }
}
