//! An in-memory chain endpoint.
//!
//! `MockChain` records every batch submitted to it and answers with a
//! configurable outcome. It backs the dry-run mode of the CLI and the tests.

use alloc::sync::Arc;
use std::sync::Mutex;

use tracing::debug;

use crate::chain::handle::{ChainHandle, TxResponse};
use crate::error::Error;
use crate::msgs::RelayMsg;
use crate::path_end::PathEnd;
use crate::util::lock::LockExt;

/// How a [`MockChain`] answers submissions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behaviour {
    Accept,
    Reject { code: u32, log: String },
    Fail { reason: String },
}

#[derive(Debug)]
struct MockState {
    behaviour: Behaviour,
    height: u64,
    submissions: Vec<Vec<RelayMsg>>,
}

#[derive(Clone, Debug)]
pub struct MockChain {
    path_end: PathEnd,
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    pub fn new(path_end: PathEnd) -> Self {
        Self::with_behaviour(path_end, Behaviour::Accept)
    }

    pub fn with_behaviour(path_end: PathEnd, behaviour: Behaviour) -> Self {
        Self {
            path_end,
            state: Arc::new(Mutex::new(MockState {
                behaviour,
                height: 1,
                submissions: Vec::new(),
            })),
        }
    }

    pub fn set_behaviour(&self, behaviour: Behaviour) {
        self.state.acquire().behaviour = behaviour;
    }

    /// Every batch passed to [`ChainHandle::send_msgs`], accepted or not.
    pub fn submissions(&self) -> Vec<Vec<RelayMsg>> {
        self.state.acquire().submissions.clone()
    }

    pub fn submission_count(&self) -> usize {
        self.state.acquire().submissions.len()
    }
}

impl ChainHandle for MockChain {
    fn path_end(&self) -> PathEnd {
        self.path_end.clone()
    }

    fn send_msgs(&self, msgs: &[RelayMsg]) -> Result<TxResponse, Error> {
        let mut state = self.state.acquire();
        state.submissions.push(msgs.to_vec());

        debug!(chain.id = %self.path_end.chain_id, "mock chain received {} message(s)", msgs.len());

        let (code, log) = match &state.behaviour {
            Behaviour::Accept => (0, String::new()),
            Behaviour::Reject { code, log } => (*code, log.clone()),
            Behaviour::Fail { reason } => {
                return Err(Error::submission(
                    self.path_end.chain_id.clone(),
                    reason.clone(),
                ))
            }
        };

        state.height += 1;

        Ok(TxResponse {
            height: state.height,
            hash: format!("{:064X}", state.height),
            code,
            log,
        })
    }
}
