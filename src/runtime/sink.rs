/// Per-step event sink
///
/// The engine hands every completed step to the sink and awaits the delivery
/// before choosing the next node, so consumers observe steps strictly in order
/// and a slow consumer backpressures the run.

use crate::runtime::result::ExecutionLog;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};

/// Ordered, awaited consumer of step logs.
pub trait StepSink: Send + Sync {
    /// Deliver one step. An error aborts the run.
    fn deliver<'a>(&'a self, log: &'a ExecutionLog) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// A step log handed to a channel consumer
///
/// The run that produced it stays parked until this value is dropped, so the
/// consumer decides when the next step may start.
#[derive(Debug)]
pub struct StepDelivery {
    pub log: ExecutionLog,
    _done: oneshot::Sender<()>,
}

impl StepDelivery {
    /// Take the log and release the run
    pub fn into_log(self) -> ExecutionLog {
        self.log
    }
}

/// Channel sink: `deliver` resolves once the receiver has taken the log and
/// dropped its [`StepDelivery`].
impl StepSink for mpsc::Sender<StepDelivery> {
    fn deliver<'a>(&'a self, log: &'a ExecutionLog) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            let (done, released) = oneshot::channel();
            self.send(StepDelivery {
                log: log.clone(),
                _done: done,
            })
            .await
            .map_err(|_| anyhow::anyhow!("step receiver dropped"))?;

            // Resolves on drop of the delivery, including when the receiver
            // is closed with the delivery still buffered.
            let _ = released.await;
            Ok(())
        }
        .boxed()
    }
}
