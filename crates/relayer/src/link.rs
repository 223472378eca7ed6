//! Delivery of relay batches to the two ends of a relay path.

use alloc::sync::Arc;
use core::fmt::{Display, Error as FmtError, Formatter};
use std::thread::JoinHandle;

use tracing::{debug, error, error_span, info};

use crate::action::{Action, DeliverMsgsAction};
use crate::chain::handle::ChainHandle;
use crate::controller::{Controller, Decision};
use crate::error::Error;
use crate::msgs::{marshal_msgs, RelayMsg};
use crate::registry::ChainRegistry;
use crate::util::task::spawn_task;

pub mod relay_msgs;

pub use relay_msgs::RelayMsgs;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Source,
    Destination,
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Target::Source => write!(f, "Source"),
            Target::Destination => write!(f, "Destination"),
        }
    }
}

/// A relay path between two chains, with the controller (if any) that gets
/// to see every batch before it is submitted.
#[derive(Clone, Debug)]
pub struct Link<Handle: ChainHandle> {
    src: Handle,
    dst: Handle,
    registry: Arc<ChainRegistry<Handle>>,
    controller: Option<Controller>,
}

impl<Handle: ChainHandle> Link<Handle> {
    pub fn new(
        src: Handle,
        dst: Handle,
        registry: Arc<ChainRegistry<Handle>>,
        controller: Option<Controller>,
    ) -> Self {
        Self {
            src,
            dst,
            registry,
            controller,
        }
    }

    pub fn src_chain(&self) -> &Handle {
        &self.src
    }

    pub fn dst_chain(&self) -> &Handle {
        &self.dst
    }

    /// Delivers `batch`, recording the outcome in it, and returns whether it succeeded.
    ///
    /// An attached controller is consulted first. If it takes the batch over,
    /// the batch counts as delivered; if the upcall fails, as failed. In both
    /// cases neither chain is contacted. Otherwise each non-empty side is
    /// submitted to its chain, source first, and the batch succeeds only if
    /// every submission was accepted. A rejection on one side does not stop
    /// the other side from being submitted.
    pub fn deliver(&self, batch: &mut RelayMsgs) -> bool {
        if let Some(controller) = &self.controller {
            let action = Action::RelayerSend(DeliverMsgsAction {
                src: self.registry.register(&self.src),
                dst: self.registry.register(&self.dst),
                src_msgs: marshal_msgs(&batch.src),
                dst_msgs: marshal_msgs(&batch.dst),
                last: batch.last,
            });

            match controller.upcall(&action) {
                Ok(Decision::Proceed) => {
                    debug!("[{}] controller let the batch through", self);
                }
                Ok(Decision::TakenOver) => {
                    info!("[{}] controller took over batch: {}", self, batch);
                    return batch.conclude(true);
                }
                Err(e) => {
                    error!("[{}] error calling controller: {}", self, e);
                    return batch.conclude(false);
                }
            }
        }

        let src_ok = submit(&self.src, &batch.src, Target::Source);
        let dst_ok = submit(&self.dst, &batch.dst, Target::Destination);

        batch.conclude(src_ok && dst_ok)
    }

    /// Runs one relay round for `batch` on its own thread.
    pub fn spawn_delivery(&self, mut batch: RelayMsgs) -> Result<JoinHandle<RelayMsgs>, Error> {
        let link = self.clone();

        let span = error_span!(
            "relay.round",
            src_chain = %self.src.id(),
            dst_chain = %self.dst.id(),
        );

        spawn_task(
            format!("relay:{}->{}", self.src.id(), self.dst.id()),
            span,
            move || {
                link.deliver(&mut batch);
                batch
            },
        )
    }
}

impl<Handle: ChainHandle> Display for Link<Handle> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{} -> {}", self.src.path_end(), self.dst.path_end())
    }
}

/// Submits one side of a batch, returning whether the chain accepted it.
/// Empty sides are not submitted and count as accepted.
fn submit<Handle: ChainHandle>(chain: &Handle, msgs: &[RelayMsg], target: Target) -> bool {
    if msgs.is_empty() {
        return true;
    }

    debug!(chain.id = %chain.id(), "submitting {} message(s) to {}", msgs.len(), target);

    let outcome = chain.send_msgs(msgs);

    match &outcome {
        Ok(tx) if tx.is_accepted() => {
            chain.log_success_tx(tx, msgs);
            true
        }
        _ => {
            chain.log_failed_tx(&outcome, msgs);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::{Link, RelayMsgs};
    use crate::chain::mock::{Behaviour, MockChain};
    use crate::controller::Controller;
    use crate::msgs::{MsgKind, RelayMsg};
    use crate::path_end::PathEnd;
    use crate::registry::ChainRegistry;
    use crate::test_utils::{spawn_controller, ControllerReply};
    use test_log::test;

    fn chains() -> (MockChain, MockChain) {
        (
            MockChain::new(PathEnd::new("A").with_channel("transfer", "channel-0")),
            MockChain::new(PathEnd::new("B").with_channel("transfer", "channel-1")),
        )
    }

    fn msgs(kind: MsgKind, n: usize) -> Vec<RelayMsg> {
        (0..n).map(|i| RelayMsg::new(kind.clone(), format!("{i}"))).collect()
    }

    fn standalone(src: &MockChain, dst: &MockChain) -> Link<MockChain> {
        Link::new(
            src.clone(),
            dst.clone(),
            Arc::new(ChainRegistry::new()),
            None,
        )
    }

    fn controlled(src: &MockChain, dst: &MockChain, reply: ControllerReply) -> Link<MockChain> {
        let (bridge, _seen) = spawn_controller(move |_| reply.clone());

        Link::new(
            src.clone(),
            dst.clone(),
            Arc::new(ChainRegistry::new()),
            Some(Controller::new(bridge)),
        )
    }

    #[test]
    fn source_only_batch_is_submitted_to_source_only() {
        let (src, dst) = chains();
        let link = standalone(&src, &dst);
        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 2), vec![]);

        assert!(link.deliver(&mut batch));
        assert!(batch.succeeded());
        assert_eq!(src.submissions(), vec![batch.src.clone()]);
        assert_eq!(dst.submission_count(), 0);
    }

    #[test]
    fn source_only_batch_reflects_source_outcome() {
        let (src, dst) = chains();
        src.set_behaviour(Behaviour::Reject {
            code: 5,
            log: "insufficient funds".to_string(),
        });
        let link = standalone(&src, &dst);
        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), vec![]);

        assert!(!link.deliver(&mut batch));
        assert!(!batch.succeeded());
        assert_eq!(dst.submission_count(), 0);
    }

    #[test]
    fn partial_failure_still_attempts_both_sides() {
        let (src, dst) = chains();
        src.set_behaviour(Behaviour::Fail {
            reason: "rpc down".to_string(),
        });
        let link = standalone(&src, &dst);
        let mut batch = RelayMsgs::new(
            msgs(MsgKind::Timeout, 1),
            msgs(MsgKind::Acknowledgement, 3),
        );

        assert!(!link.deliver(&mut batch));
        assert_eq!(src.submission_count(), 1);
        assert_eq!(dst.submission_count(), 1);
        assert_eq!(dst.submissions()[0].len(), 3);
    }

    #[test]
    fn non_zero_code_on_destination_fails_the_batch() {
        let (src, dst) = chains();
        dst.set_behaviour(Behaviour::Reject {
            code: 11,
            log: "out of gas".to_string(),
        });
        let link = standalone(&src, &dst);
        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), msgs(MsgKind::Packet, 1));

        assert!(!link.deliver(&mut batch));
        assert_eq!(src.submission_count(), 1);
    }

    #[test]
    fn empty_batch_succeeds_without_submitting() {
        let (src, dst) = chains();
        let link = standalone(&src, &dst);
        let mut batch = RelayMsgs::default();

        assert!(!batch.ready());
        assert!(link.deliver(&mut batch));
        assert_eq!(src.submission_count() + dst.submission_count(), 0);
    }

    #[test]
    fn controller_replying_true_falls_through_to_submission() {
        let (src, dst) = chains();
        let link = controlled(&src, &dst, ControllerReply::ok("true"));

        for _ in 0..3 {
            let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), msgs(MsgKind::UpdateClient, 1));
            assert!(link.deliver(&mut batch));
        }

        assert_eq!(src.submission_count(), 3);
        assert_eq!(dst.submission_count(), 3);
    }

    #[test]
    fn controller_veto_counts_as_success_without_submission() {
        let (src, dst) = chains();
        src.set_behaviour(Behaviour::Fail {
            reason: "must not be called".to_string(),
        });
        let link = controlled(&src, &dst, ControllerReply::ok("handled"));
        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), msgs(MsgKind::Packet, 1));

        assert!(link.deliver(&mut batch));
        assert!(batch.succeeded());
        assert_eq!(src.submission_count(), 0);
        assert_eq!(dst.submission_count(), 0);
    }

    #[test]
    fn controller_error_fails_without_submission() {
        let (src, dst) = chains();
        let link = controlled(&src, &dst, ControllerReply::err("controller unavailable"));
        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), vec![]);

        assert!(!link.deliver(&mut batch));
        assert!(!batch.succeeded());
        assert_eq!(src.submission_count(), 0);
        assert_eq!(dst.submission_count(), 0);
    }

    #[test]
    fn upcall_registers_both_ends() {
        let (src, dst) = chains();
        let registry = Arc::new(ChainRegistry::new());
        let (bridge, seen) = spawn_controller(|_| ControllerReply::ok("mine"));
        let link = Link::new(
            src.clone(),
            dst.clone(),
            registry.clone(),
            Some(Controller::new(bridge)),
        );

        let mut batch = RelayMsgs::new(msgs(MsgKind::Packet, 1), vec![]).with_last(true);
        assert!(link.deliver(&mut batch));

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve(&PathEnd::new("A").with_channel("transfer", "channel-0")).is_some());

        let payload = seen.recv().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "RELAYER_SEND");
        assert_eq!(value["src"]["chain-id"], "A");
        assert_eq!(value["dst"]["chain-id"], "B");
        assert_eq!(value["src_msgs"][0]["type"], "MsgPacket");
        assert_eq!(value["last"], true);
    }

    #[test]
    fn rounds_run_on_their_own_threads() {
        let (src, dst) = chains();
        let link = standalone(&src, &dst);

        let rounds: Vec<_> = (0..4)
            .map(|_| {
                link.spawn_delivery(RelayMsgs::new(msgs(MsgKind::Packet, 1), vec![]))
                    .unwrap()
            })
            .collect();

        for round in rounds {
            assert!(round.join().unwrap().succeeded());
        }

        assert_eq!(src.submission_count(), 4);
    }
}
