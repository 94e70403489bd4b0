use std::{str::FromStr, sync::Arc};

use hyper::Uri;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{client::legacy::connect::HttpConnector, rt::TokioExecutor};
use tokio_rustls::rustls::{
    client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    crypto::{aws_lc_rs, CryptoProvider},
    pki_types::{CertificateDer, ServerName, UnixTime},
    ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};

use crate::pipeline::StdError;

/// The HTTP/2 client an [`super::OtlpExporter`] talks through.
///
/// tonic's own transport has no switch for unverified TLS, which in-mesh
/// collectors with self-signed certificates need, so the exporter dials
/// through hyper-rustls instead.
pub type ChannelType = hyper_util::client::legacy::Client<
    hyper_rustls::HttpsConnector<HttpConnector>,
    tonic::body::BoxBody,
>;

/// Build a gRPC client for a collector at `endpoint`, e.g. `https://collector:4317`.
///
/// Plain `http://` endpoints are spoken to without TLS. For `https://`, pass
/// `|| None` as `tls_trust` to skip certificate verification entirely, or
/// provide trust roots, for example:
/// ```rust
/// || {
///     Some(tokio_rustls::rustls::RootCertStore {
///         roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
///     })
/// };
/// ```
/// `with_origin` is the generated client's constructor, such as
/// `MetricsServiceClient::with_origin`. [`super::OtlpExporter::connect`] does
/// this for you.
pub fn get_client<TrustFunction, WithOrigin, U>(
    endpoint: &str,
    tls_trust: TrustFunction,
    with_origin: WithOrigin,
) -> Result<U, StdError>
where
    TrustFunction: FnOnce() -> Option<RootCertStore>,
    WithOrigin: Fn(ChannelType, Uri) -> U,
{
    let origin = Uri::from_str(endpoint)?;
    let connector = collector_connector(tls_config(tls_trust())?);
    let client = hyper_util::client::legacy::Client::builder(TokioExecutor::new())
        .http2_only(true)
        .build(connector);

    // scheme and authority of every request come from `origin`
    Ok(with_origin(client, origin))
}

/// TCP with TLS when the scheme asks for it. Only h2 is offered.
fn collector_connector(tls: ClientConfig) -> hyper_rustls::HttpsConnector<HttpConnector> {
    let mut tcp = HttpConnector::new();
    tcp.enforce_http(false);
    tower::ServiceBuilder::new()
        .layer_fn(|tcp| {
            HttpsConnectorBuilder::new()
                .with_tls_config(tls.clone())
                .https_or_http()
                .enable_http2()
                .wrap_connector(tcp)
        })
        .service(tcp)
}

/// Accepts any server certificate. Signatures are not checked either.
#[derive(Debug)]
struct InsecureVerifier {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for InsecureVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod test {
    use crate::proto::opentelemetry::collector::metrics::v1::metrics_service_client::MetricsServiceClient;

    use super::get_client;

    #[test_log::test(tokio::test)]
    async fn builds_clients_with_and_without_trust_roots() {
        assert!(get_client(
            "https://collector.example:4317",
            || None,
            MetricsServiceClient::with_origin
        )
        .is_ok());
        assert!(get_client(
            "https://collector.example:4317",
            || {
                Some(tokio_rustls::rustls::RootCertStore {
                    roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
                })
            },
            MetricsServiceClient::with_origin
        )
        .is_ok());
    }

    #[test_log::test]
    fn rejects_malformed_endpoints() {
        assert!(get_client("not a uri", || None, MetricsServiceClient::with_origin).is_err());
    }
}
