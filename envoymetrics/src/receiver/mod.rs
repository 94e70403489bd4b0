//! The receiving end of Envoy's metrics service.
//!
//! Every stream is handled sequentially on its own: a message is validated,
//! translated and handed to the consumer before the next one is read. Streams
//! share nothing but the consumer.

mod service;
mod validation;

pub use service::MetricsReceiverService;
pub use validation::{validate, ValidationError};

use std::{pin::pin, sync::Arc};

use futures::{Stream, StreamExt};
use tokio::sync::watch;

use crate::{
    pipeline::{MetricsConsumer, StdError},
    proto::envoy::service::metrics::v3::StreamMetricsMessage,
    translate::{ConvertError, Translator},
    types::{Identity, IdentityLabels},
};

/// Why a stream was terminated. None of these affect other streams.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    /// A message failed structural validation
    #[error("invalid stream message: {0}")]
    InvalidMessage(#[from] ValidationError),
    /// A message could not be translated
    #[error("could not translate stream message: {0}")]
    Conversion(#[from] ConvertError),
    /// The consumer refused a document
    #[error("metrics consumer failed: {0}")]
    Consumer(#[source] StdError),
    /// The transport delivered an error instead of a message
    #[error("stream transport failed: {0}")]
    Transport(#[from] tonic::Status),
    /// The receiver was asked to shut down
    #[error("metrics receiver is shutting down")]
    Cancelled,
}

impl From<ReceiverError> for tonic::Status {
    fn from(error: ReceiverError) -> Self {
        match error {
            ReceiverError::InvalidMessage(_) | ReceiverError::Conversion(_) => {
                tonic::Status::invalid_argument(error.to_string())
            }
            ReceiverError::Consumer(error) => match error.downcast::<tonic::Status>() {
                Ok(status) => *status,
                Err(error) => {
                    tonic::Status::unavailable(format!("metrics consumer failed: {error}"))
                }
            },
            ReceiverError::Transport(status) => status,
            ReceiverError::Cancelled => tonic::Status::cancelled(error.to_string()),
        }
    }
}

/// Drives metrics streams into a consumer.
pub struct StreamReceiver<C> {
    translator: Translator,
    consumer: Arc<C>,
}

impl<C> Clone for StreamReceiver<C> {
    fn clone(&self) -> Self {
        Self {
            translator: self.translator.clone(),
            consumer: self.consumer.clone(),
        }
    }
}

impl<C> StreamReceiver<C>
where
    C: MetricsConsumer,
{
    /// A receiver handing documents to `consumer`
    pub fn new(translator: Translator, consumer: C) -> Self {
        Self::from_arc(translator, Arc::new(consumer))
    }

    /// A receiver sharing an existing consumer
    pub fn from_arc(translator: Translator, consumer: Arc<C>) -> Self {
        Self {
            translator,
            consumer,
        }
    }

    /// The consumer documents are handed to
    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    /// Process one stream until it ends, fails or `shutdown` turns true.
    ///
    /// Returns the number of documents handed off when the stream ends cleanly.
    /// Any error ends the stream without reading further messages. Shutdown is
    /// checked before every read, so buffered messages are not processed once
    /// it is signalled. A hand-off still waiting on the consumer is abandoned
    /// too; the consumer sees either the whole document or none of it. A
    /// dropped shutdown sender never cancels.
    pub async fn handle_stream<S>(
        &self,
        stream: S,
        shutdown: watch::Receiver<bool>,
    ) -> Result<u64, ReceiverError>
    where
        S: Stream<Item = Result<StreamMetricsMessage, tonic::Status>>,
    {
        let result = self.receive(stream, shutdown).await;
        if let Err(error) = &result {
            log::warn!("metrics stream terminated: {error}");
        }
        result
    }

    async fn receive<S>(
        &self,
        stream: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64, ReceiverError>
    where
        S: Stream<Item = Result<StreamMetricsMessage, tonic::Status>>,
    {
        let mut stream = pin!(stream);
        let mut identity = Identity::Unresolved;
        let mut forwarded = 0;
        loop {
            let next = tokio::select! {
                biased;

                _ = shutdown_signal(&mut shutdown) => return Err(ReceiverError::Cancelled),
                next = stream.next() => next,
            };
            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(status)) => return Err(ReceiverError::Transport(status)),
                None => {
                    log::debug!(
                        "metrics stream {} ended after {forwarded} documents",
                        identity.labels().cloned().unwrap_or_default()
                    );
                    return Ok(forwarded);
                }
            };
            let labels = self
                .handle_message(identity, message, &mut shutdown)
                .await?;
            identity = Identity::Resolved(labels);
            forwarded += 1;
        }
    }

    async fn handle_message(
        &self,
        identity: Identity,
        message: StreamMetricsMessage,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<IdentityLabels, ReceiverError> {
        validate(&message)?;

        let first = identity.labels().is_none();
        let labels = identity.resolve(message.identifier.as_ref());
        if first {
            log::debug!("metrics stream opened for {labels}");
        }

        let document = self.translator.translate(&labels, &message.envoy_metrics)?;
        log::trace!("handing off {document}");
        tokio::select! {
            biased;

            _ = shutdown_signal(shutdown) => Err(ReceiverError::Cancelled),
            consumed = self.consumer.consume(document) => {
                consumed.map_err(ReceiverError::Consumer)?;
                Ok(labels)
            }
        }
    }
}

async fn shutdown_signal(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        // sender dropped without signalling
        std::future::pending::<()>().await
    }
}
