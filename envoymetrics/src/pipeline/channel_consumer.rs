use std::future::Future;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::translate::MetricsDocument;

use super::{MetricsConsumer, StdError};

/// The receiving half of a [`ChannelConsumer`] was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("metrics document channel is closed")]
pub struct ChannelClosed;

/// A consumer that queues documents in a bounded mpsc for a downstream task.
/// When the queue is full the hand-off waits for capacity.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    queue: mpsc::Sender<MetricsDocument>,
}

impl ChannelConsumer {
    /// Create a new channel consumer.
    /// The stream yields documents in the order each stream handed them off.
    pub fn new(capacity: usize) -> (Self, ReceiverStream<MetricsDocument>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        (Self { queue: sender }, ReceiverStream::new(receiver))
    }
}

impl MetricsConsumer for ChannelConsumer {
    fn consume(
        &self,
        document: MetricsDocument,
    ) -> impl Future<Output = Result<(), StdError>> + Send {
        async move {
            self.queue.send(document).await.map_err(|_| {
                log::debug!("could not queue metrics document: receiver is gone");
                StdError::from(ChannelClosed)
            })
        }
    }
}
