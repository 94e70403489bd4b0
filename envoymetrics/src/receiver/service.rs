use tokio::sync::watch;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use crate::{
    config::ReceiverConfig,
    pipeline::{ChannelConsumer, MetricsConsumer},
    proto::envoy::service::metrics::v3::{
        metrics_service_server::{MetricsService, MetricsServiceServer},
        StreamMetricsMessage, StreamMetricsResponse,
    },
    translate::{MetricsDocument, Translator},
};

use super::StreamReceiver;

/// The `envoy.service.metrics.v3.MetricsService` gRPC service.
///
/// Each Envoy connection is one call to `StreamMetrics`; calls run
/// independently and share only the consumer. Flip the shutdown channel to
/// `true` to end every open stream with `CANCELLED`.
pub struct MetricsReceiverService<C> {
    receiver: StreamReceiver<C>,
    shutdown: watch::Receiver<bool>,
    max_decoding_message_size: usize,
}

impl<C> MetricsReceiverService<C>
where
    C: MetricsConsumer,
{
    /// Create a service handing every stream's documents to `consumer`
    pub fn new(config: &ReceiverConfig, consumer: C, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            receiver: StreamReceiver::new(Translator::new(config.translator.clone()), consumer),
            shutdown,
            max_decoding_message_size: config.max_decoding_message_size,
        }
    }

    /// The per-stream receiver this service drives
    pub fn receiver(&self) -> &StreamReceiver<C> {
        &self.receiver
    }

    /// Wrap this in the generated server, ready to add to a tonic router
    pub fn into_server(self) -> MetricsServiceServer<Self> {
        let max_decoding_message_size = self.max_decoding_message_size;
        MetricsServiceServer::new(self).max_decoding_message_size(max_decoding_message_size)
    }
}

impl MetricsReceiverService<ChannelConsumer> {
    /// Create a service that queues documents for your own task, up to
    /// `config.channel_capacity` deep
    pub fn channel(
        config: &ReceiverConfig,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, ReceiverStream<MetricsDocument>) {
        let (consumer, documents) = ChannelConsumer::new(config.channel_capacity);
        (Self::new(config, consumer, shutdown), documents)
    }
}

#[tonic::async_trait]
impl<C> MetricsService for MetricsReceiverService<C>
where
    C: MetricsConsumer,
{
    async fn stream_metrics(
        &self,
        request: Request<Streaming<StreamMetricsMessage>>,
    ) -> Result<Response<StreamMetricsResponse>, Status> {
        let remote = request.remote_addr();
        log::debug!("metrics stream connected from {remote:?}");

        let forwarded = self
            .receiver
            .handle_stream(request.into_inner(), self.shutdown.clone())
            .await?;

        log::debug!("metrics stream from {remote:?} closed after {forwarded} documents");
        Ok(Response::new(StreamMetricsResponse {}))
    }
}
