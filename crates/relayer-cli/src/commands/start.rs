use alloc::sync::Arc;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use eyre::eyre;
use tracing::{error_span, info};

use ibc_relayer_bridge::bridge::ControllerTransport;
use ibc_relayer_bridge::chain::handle::ChainHandle;
use ibc_relayer_bridge::chain::mock::MockChain;
use ibc_relayer_bridge::config::Config;
use ibc_relayer_bridge::error::Error;
use ibc_relayer_bridge::host::Host;
use ibc_relayer_bridge::link::RelayMsgs;
use ibc_relayer_bridge::path_end::PathEnd;
use ibc_relayer_bridge::util::task::spawn_task;

use crate::batches;
use crate::stdio::{self, LineWriter, StdioTransport};

#[derive(Clone, Debug, Parser, PartialEq, Eq)]
pub struct StartCmd {
    #[clap(
        long = "batches",
        required = true,
        value_name = "FILE",
        help = "Path to the JSON file listing the batches to deliver"
    )]
    batches: PathBuf,

    #[clap(
        long = "standalone",
        help = "Do not attach a controller over stdio, submit every batch directly"
    )]
    standalone: bool,

    /// Arguments handed to the relay session
    #[clap(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

impl StartCmd {
    pub fn run(&self, config: &Config) -> eyre::Result<()> {
        config.validate()?;

        let host = Arc::new(Host::<MockChain>::new(config.mode));

        for chain in &config.chains {
            host.registry().register(&MockChain::new(chain.path_end()));
        }

        let mut rounds = Vec::new();

        for spec in batches::load(&self.batches)? {
            let (src, dst) = spec.path_ends(config)?;

            let resolve = |path_end: PathEnd| {
                host.registry()
                    .resolve(&path_end)
                    .ok_or_else(|| eyre!("no chain registered for endpoint {}", path_end))
            };

            rounds.push((resolve(src)?, resolve(dst)?, spec.relay_msgs()));
        }

        let writer = LineWriter::new(io::stdout());

        let transport: Option<Arc<dyn ControllerTransport>> = if self.standalone {
            None
        } else {
            Some(Arc::new(StdioTransport::new(writer.clone())))
        };

        let session = host.start(self.args.clone(), transport, move |ctx| {
            let total = rounds.len();

            for (i, (src, dst, batch)) in rounds.into_iter().enumerate() {
                if !batch.ready() {
                    info!(round = i, "skipping empty batch");
                    continue;
                }

                let link = ctx.link(src, dst);
                let batch: RelayMsgs = link
                    .spawn_delivery(batch)?
                    .join()
                    .map_err(|_| Error::panicked(ctx.id))?;

                info!(
                    round = i,
                    src_chain = %link.src_chain().id(),
                    dst_chain = %link.dst_chain().id(),
                    succeeded = batch.succeeded(),
                    "delivered batch {}/{}: {}",
                    i + 1,
                    total,
                    batch
                );
            }

            Ok(())
        })?;

        let reader = if self.standalone {
            None
        } else {
            let host = host.clone();

            let reader = spawn_task(
                "controller-reader".to_string(),
                error_span!("controller"),
                move || stdio::serve(&host, io::stdin().lock(), &writer).map(|_| ()),
            )?;

            Some(reader)
        };

        // A call left unanswered when the controller closes stdin keeps the
        // session blocked; the reader reports it when it sees the end of input.
        host.wait(session)?;

        info!(%session, "relay session finished");

        if let Some(reader) = reader {
            info!("serving controller requests until it closes stdin");

            reader
                .join()
                .map_err(|_| eyre!("controller reader panicked"))??;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use test_log::test;

    use super::StartCmd;

    #[test]
    fn test_start_with_session_args() {
        assert_eq!(
            StartCmd {
                batches: PathBuf::from("batches.json"),
                standalone: false,
                args: vec!["Hello".to_string(), "world!".to_string()],
            },
            StartCmd::parse_from([
                "test",
                "--batches",
                "batches.json",
                "--",
                "Hello",
                "world!"
            ])
        )
    }

    #[test]
    fn test_start_standalone() {
        assert_eq!(
            StartCmd {
                batches: PathBuf::from("b.json"),
                standalone: true,
                args: vec![],
            },
            StartCmd::parse_from(["test", "--batches", "b.json", "--standalone"])
        )
    }

    #[test]
    fn test_start_requires_batches() {
        assert!(StartCmd::try_parse_from(["test"]).is_err())
    }
}
