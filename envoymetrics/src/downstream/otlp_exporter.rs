use std::future::Future;

use tokio_rustls::rustls::RootCertStore;
use tonic::metadata::{errors::InvalidMetadataKey, AsciiMetadataKey, AsciiMetadataValue};

use crate::{
    downstream::{get_client, ChannelType},
    pipeline::{MetricsConsumer, StdError},
    proto::opentelemetry::collector::metrics::v1::{
        metrics_service_client::MetricsServiceClient, ExportMetricsServiceRequest,
    },
    translate::MetricsDocument,
};

/// Exports each document to an OpenTelemetry collector as it arrives.
///
/// One export call per document, no batching and no retry. A failed export is
/// the consumer error, so it ends the Envoy stream the document came from.
pub struct OtlpExporter<TChannel> {
    client: MetricsServiceClient<TChannel>,
    header: Option<(AsciiMetadataKey, AsciiMetadataValue)>,
}

impl<TChannel> OtlpExporter<TChannel>
where
    TChannel: tonic::client::GrpcService<tonic::body::BoxBody> + Clone + Send + Sync + 'static,
    TChannel::Future: Send,
    TChannel::Error: Into<StdError>,
    TChannel::ResponseBody: http_body::Body<Data = bytes::Bytes> + Send + 'static,
    <TChannel::ResponseBody as http_body::Body>::Error: Into<StdError> + Send,
{
    /// Create a new exporter from a grpc client. `header` is attached to every
    /// export, e.g. an api key.
    pub fn new(
        client: MetricsServiceClient<TChannel>,
        header: Option<(impl Into<String>, AsciiMetadataValue)>,
    ) -> Result<Self, InvalidMetadataKey> {
        let header = match header {
            Some((key, value)) => Some((key.into().parse()?, value)),
            None => None,
        };
        Ok(Self { client, header })
    }

    fn request<T>(&self, request: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(request);
        if let Some((header, value)) = self.header.as_ref() {
            request.metadata_mut().insert(header.clone(), value.clone());
        }
        request
    }
}

impl OtlpExporter<ChannelType> {
    /// Create an exporter for the collector at `endpoint` over an HTTP/2
    /// hyper-rustls client. See [`get_client`] for what `tls_trust` means.
    ///
    /// Nothing is dialed until the first export.
    pub fn connect(
        endpoint: &str,
        tls_trust: impl FnOnce() -> Option<RootCertStore>,
        header: Option<(impl Into<String>, AsciiMetadataValue)>,
    ) -> Result<Self, StdError> {
        let client = get_client(endpoint, tls_trust, MetricsServiceClient::with_origin)?;
        Ok(Self::new(client, header)?)
    }
}

impl<TChannel> MetricsConsumer for OtlpExporter<TChannel>
where
    TChannel: tonic::client::GrpcService<tonic::body::BoxBody> + Clone + Send + Sync + 'static,
    TChannel::Future: Send,
    TChannel::Error: Into<StdError>,
    TChannel::ResponseBody: http_body::Body<Data = bytes::Bytes> + Send + 'static,
    <TChannel::ResponseBody as http_body::Body>::Error: Into<StdError> + Send,
{
    fn consume(
        &self,
        document: MetricsDocument,
    ) -> impl Future<Output = Result<(), StdError>> + Send {
        let mut client = self.client.clone();
        let request = self.request(ExportMetricsServiceRequest::from(document));
        async move {
            let response = match client.export(request).await {
                Ok(response) => response.into_inner(),
                Err(status) => {
                    if !status.metadata().is_empty() {
                        log::error!(
                            "failed to export metrics: {status}. Metadata: {:?}",
                            status.metadata()
                        );
                    }
                    return Err(StdError::from(status));
                }
            };
            match response.partial_success {
                Some(partial) if 0 < partial.rejected_data_points => log::warn!(
                    "collector rejected {} data points: {}",
                    partial.rejected_data_points,
                    partial.error_message
                ),
                _ => log::debug!("exported metrics"),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use tokio::sync::mpsc;
    use tonic::{
        metadata::AsciiMetadataValue,
        transport::{server::TcpIncoming, Endpoint, Server},
        Request, Response, Status,
    };

    use crate::{
        pipeline::MetricsConsumer,
        proto::{
            io::prometheus::client::MetricType,
            opentelemetry::collector::metrics::v1::{
                metrics_service_client::MetricsServiceClient,
                metrics_service_server::{MetricsService, MetricsServiceServer},
                ExportMetricsServiceRequest, ExportMetricsServiceResponse,
            },
        },
        translate::{
            test_families::{family, gauge_sample},
            Translator,
        },
        types::IdentityLabels,
    };

    use super::OtlpExporter;

    type Received = (Option<String>, ExportMetricsServiceRequest);

    struct Collector {
        received: mpsc::Sender<Received>,
        refuse: bool,
    }

    #[tonic::async_trait]
    impl MetricsService for Collector {
        async fn export(
            &self,
            request: Request<ExportMetricsServiceRequest>,
        ) -> Result<Response<ExportMetricsServiceResponse>, Status> {
            if self.refuse {
                return Err(Status::resource_exhausted("collector is full"));
            }
            let tenant = request
                .metadata()
                .get("x-tenant")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            self.received
                .send((tenant, request.into_inner()))
                .await
                .map_err(|_| Status::internal("test is over"))?;
            Ok(Response::new(ExportMetricsServiceResponse::default()))
        }
    }

    async fn serve_collector(collector: Collector) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("can bind loopback");
        let address = listener.local_addr().expect("listener has an address");
        let incoming = TcpIncoming::from_listener(listener, true, None).expect("incoming works");
        tokio::spawn(
            Server::builder()
                .add_service(MetricsServiceServer::new(collector))
                .serve_with_incoming(incoming),
        );
        address
    }

    async fn exporter(
        refuse: bool,
    ) -> (
        OtlpExporter<tonic::transport::Channel>,
        mpsc::Receiver<Received>,
    ) {
        let (sender, received) = mpsc::channel(4);
        let address = serve_collector(Collector {
            received: sender,
            refuse,
        })
        .await;

        let channel = Endpoint::from_shared(format!("http://{address}"))
            .expect("endpoint is valid")
            .connect()
            .await
            .expect("collector is listening");
        let exporter = OtlpExporter::new(
            MetricsServiceClient::new(channel),
            Some(("x-tenant", AsciiMetadataValue::from_static("mesh"))),
        )
        .expect("header name is valid");
        (exporter, received)
    }

    #[test_log::test(tokio::test)]
    async fn exports_each_document() {
        let (exporter, mut received) = exporter(false).await;
        let document = Translator::default()
            .translate(
                &IdentityLabels::from_iter([("cluster", "c1")]),
                &[family(
                    "cx_active",
                    MetricType::Gauge,
                    vec![gauge_sample(&[], 3.0, 1_000)],
                )],
            )
            .expect("families are well formed");

        exporter
            .consume(document.clone())
            .await
            .expect("collector accepts");

        let (tenant, request) = received.recv().await.expect("collector received a request");
        assert_eq!(Some("mesh".to_string()), tenant);
        assert_eq!(ExportMetricsServiceRequest::from(document), request);
    }

    #[test_log::test(tokio::test)]
    async fn refused_exports_are_consumer_errors() {
        let (exporter, _received) = exporter(true).await;
        let document = Translator::default()
            .translate(&IdentityLabels::empty(), &[])
            .expect("nothing to translate");
        let error = exporter
            .consume(document)
            .await
            .expect_err("collector refuses");
        let status = error.downcast::<Status>().expect("export errors are statuses");
        assert_eq!(tonic::Code::ResourceExhausted, status.code());
    }

    #[test_log::test(tokio::test)]
    async fn connected_exporter_reaches_a_plaintext_collector() {
        let (sender, mut received) = mpsc::channel(4);
        let address = serve_collector(Collector {
            received: sender,
            refuse: false,
        })
        .await;
        let exporter = OtlpExporter::connect(
            &format!("http://{address}"),
            || None,
            Some(("x-tenant", AsciiMetadataValue::from_static("edge"))),
        )
        .expect("endpoint and header are valid");

        let document = Translator::default()
            .translate(&IdentityLabels::from_iter([("cluster", "c2")]), &[])
            .expect("nothing to translate");
        exporter
            .consume(document.clone())
            .await
            .expect("collector accepts");

        let (tenant, request) = received.recv().await.expect("collector received a request");
        assert_eq!(Some("edge".to_string()), tenant);
        assert_eq!(ExportMetricsServiceRequest::from(document), request);
    }

    #[test_log::test(tokio::test)]
    async fn connect_rejects_bad_endpoints_and_headers() {
        assert!(OtlpExporter::connect("not a uri", || None, None::<(&str, _)>).is_err());
        assert!(OtlpExporter::connect(
            "https://collector.example:4317",
            || None,
            Some(("not a header", AsciiMetadataValue::from_static("x"))),
        )
        .is_err());
    }

    #[test_log::test(tokio::test)]
    async fn invalid_header_names_are_rejected() {
        let channel = Endpoint::from_static("http://127.0.0.1:4317").connect_lazy();
        assert!(OtlpExporter::new(
            MetricsServiceClient::new(channel),
            Some(("not a header", AsciiMetadataValue::from_static("x"))),
        )
        .is_err());
    }
}
