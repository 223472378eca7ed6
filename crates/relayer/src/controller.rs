//! Upcalls giving the controller a chance to intercept relay batches.

use tracing::debug;

use crate::action::Action;
use crate::bridge::Bridge;
use crate::error::Error;

/// The only reply that lets the relayer go ahead with its own delivery.
pub const PROCEED: &str = "true";

/// What the controller decided to do with an action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Deliver the batch through the default path.
    Proceed,
    /// The controller has handled the batch; do not submit it.
    TakenOver,
}

/// A controller attached to the relayer through a [`Bridge`].
#[derive(Clone, Debug)]
pub struct Controller {
    bridge: Bridge,
}

impl Controller {
    pub fn new(bridge: Bridge) -> Self {
        Self { bridge }
    }

    /// Sends `action` to the controller and blocks until it decides.
    pub fn upcall(&self, action: &Action) -> Result<Decision, Error> {
        let payload = action.encode()?;
        let reply = self.bridge.initiate(&payload, true)?;

        debug!(action = action.type_tag(), %reply, "controller replied to upcall");

        if reply == PROCEED {
            Ok(Decision::Proceed)
        } else {
            Ok(Decision::TakenOver)
        }
    }
}
