//! Construction of the HTTP client used by OTLP/HTTP exporters.

use crate::{OtlpExporterOptions, OtlpOptionsError};
use opentelemetry_http::HttpClient;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
#[cfg(any(feature = "reqwest-blocking-client", feature = "reqwest-client"))]
use opentelemetry::otel_debug;

type FactoryFn =
    dyn Fn(&OtlpExporterOptions) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> + Send + Sync;

/// Creates the [`HttpClient`] an exporter sends its requests with.
///
/// The factory receives the options it is attached to, so a client built by
/// it always reflects the current timeout and TLS settings.
#[derive(Clone)]
pub struct HttpClientFactory(Arc<FactoryFn>);

impl HttpClientFactory {
    /// Wrap a closure as a factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&OtlpExporterOptions) -> Result<Arc<dyn HttpClient>, OtlpOptionsError>
            + Send
            + Sync
            + 'static,
    {
        HttpClientFactory(Arc::new(factory))
    }

    /// A factory which always hands out the same client.
    pub fn from_client<T: HttpClient + 'static>(client: T) -> Self {
        let client: Arc<dyn HttpClient> = Arc::new(client);
        HttpClientFactory::new(move |_| Ok(client.clone()))
    }

    /// Build a client for `options`.
    pub fn create(
        &self,
        options: &OtlpExporterOptions,
    ) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
        (self.0)(options)
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        HttpClientFactory::new(default_http_client)
    }
}

impl Debug for HttpClientFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HttpClientFactory(..)")
    }
}

/// The client built when no factory has been configured: a `reqwest` client
/// bound to the configured timeout, sending the configured headers and
/// presenting the configured TLS credentials.
///
/// With both client features enabled the blocking client is used.
#[cfg(any(feature = "reqwest-blocking-client", feature = "reqwest-client"))]
pub(crate) fn default_http_client(
    options: &OtlpExporterOptions,
) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
    #[cfg(not(feature = "tls"))]
    if options.tls().is_configured() {
        return Err(OtlpOptionsError::TlsUnsupported("tls"));
    }

    otel_debug!(
        name: "OtlpOptions.BuildingHttpClient",
        timeout_in_millisecs = options.timeout().as_millis(),
        tls = options.tls().is_configured()
    );

    build_reqwest_client(options)
}

#[cfg(feature = "reqwest-blocking-client")]
fn build_reqwest_client(
    options: &OtlpExporterOptions,
) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
    let timeout = options.timeout();
    let headers = options.header_map();
    #[cfg(feature = "tls")]
    let credentials = ReqwestCredentials::load(options)?;

    // The blocking client owns a runtime and panics when created from inside
    // another one, so it is always built on its own thread.
    let client = std::thread::Builder::new()
        .name("otlp-http-client-builder".to_string())
        .spawn(move || {
            let builder = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .default_headers(headers);
            #[cfg(feature = "tls")]
            let builder = credentials.apply_blocking(builder);
            builder.build()
        })
        .map_err(|_| OtlpOptionsError::ThreadSpawnFailed)?
        .join()
        .map_err(|_| OtlpOptionsError::ThreadSpawnFailed)??;
    Ok(Arc::new(client))
}

#[cfg(all(not(feature = "reqwest-blocking-client"), feature = "reqwest-client"))]
fn build_reqwest_client(
    options: &OtlpExporterOptions,
) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
    let builder = reqwest::Client::builder()
        .timeout(options.timeout())
        .default_headers(options.header_map());
    #[cfg(feature = "tls")]
    let builder = ReqwestCredentials::load(options)?.apply_async(builder);
    Ok(Arc::new(builder.build()?))
}

#[cfg(not(any(feature = "reqwest-blocking-client", feature = "reqwest-client")))]
pub(crate) fn default_http_client(
    _options: &OtlpExporterOptions,
) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
    Err(OtlpOptionsError::NoHttpClient)
}

/// Root certificate and client identity handed to the `reqwest` builder.
#[cfg(all(
    feature = "tls",
    any(feature = "reqwest-blocking-client", feature = "reqwest-client")
))]
#[derive(Default)]
struct ReqwestCredentials {
    root: Option<reqwest::Certificate>,
    identity: Option<reqwest::Identity>,
}

#[cfg(all(
    feature = "tls",
    any(feature = "reqwest-blocking-client", feature = "reqwest-client")
))]
impl ReqwestCredentials {
    fn load(options: &OtlpExporterOptions) -> Result<Self, OtlpOptionsError> {
        match options.tls().load_credentials()? {
            Some(credentials) => Ok(ReqwestCredentials {
                root: credentials.reqwest_root_certificate()?,
                identity: credentials.reqwest_identity()?,
            }),
            None => Ok(ReqwestCredentials::default()),
        }
    }

    #[cfg(feature = "reqwest-blocking-client")]
    fn apply_blocking(
        self,
        mut builder: reqwest::blocking::ClientBuilder,
    ) -> reqwest::blocking::ClientBuilder {
        if let Some(root) = self.root {
            builder = builder.add_root_certificate(root);
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        builder
    }

    #[cfg(all(not(feature = "reqwest-blocking-client"), feature = "reqwest-client"))]
    fn apply_async(self, mut builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        if let Some(root) = self.root {
            builder = builder.add_root_certificate(root);
        }
        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::HttpClientFactory;
    use crate::OtlpExporterOptions;
    use async_trait::async_trait;
    use bytes::Bytes;
    use opentelemetry_http::{HttpClient, HttpError, Request, Response};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct RecordingClient {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn send_bytes(&self, _request: Request<Bytes>) -> Result<Response<Bytes>, HttpError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(Response::builder().status(200).body(Bytes::new())?)
        }
    }

    #[tokio::test]
    async fn test_from_client_hands_out_the_same_client() {
        let factory = HttpClientFactory::from_client(RecordingClient::default());
        let options = OtlpExporterOptions::default();

        let first = factory.create(&options).unwrap();
        let second = factory.create(&options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let request = Request::builder()
            .uri("http://localhost:4318/v1/traces")
            .body(Bytes::from_static(b"payload"))
            .unwrap();
        let response = first.send_bytes(request).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn test_factory_sees_current_options() {
        let factory = HttpClientFactory::new(|options| {
            assert_eq!(options.timeout(), Duration::from_millis(1234));
            Ok(Arc::new(RecordingClient::default()))
        });
        let options = OtlpExporterOptions::default().with_timeout(Duration::from_millis(1234));
        assert!(factory.create(&options).is_ok());
    }

    #[test]
    fn test_factory_errors_are_propagated() {
        let factory = HttpClientFactory::new(|_| Err(crate::OtlpOptionsError::NoHttpClient));
        assert!(matches!(
            factory.create(&OtlpExporterOptions::default()),
            Err(crate::OtlpOptionsError::NoHttpClient)
        ));
    }

    #[cfg(all(
        not(feature = "tls"),
        any(feature = "reqwest-blocking-client", feature = "reqwest-client")
    ))]
    #[test]
    fn test_default_factory_rejects_tls_without_backend() {
        let options = OtlpExporterOptions::default()
            .with_tls(crate::TlsOptions::default().with_certificate_file("ca.pem"));
        assert!(matches!(
            HttpClientFactory::default().create(&options),
            Err(crate::OtlpOptionsError::TlsUnsupported(_))
        ));
    }

    #[cfg(not(any(feature = "reqwest-blocking-client", feature = "reqwest-client")))]
    #[test]
    fn test_default_factory_without_client_feature() {
        assert!(matches!(
            HttpClientFactory::default().create(&OtlpExporterOptions::default()),
            Err(crate::OtlpOptionsError::NoHttpClient)
        ));
    }

    #[cfg(any(feature = "reqwest-blocking-client", feature = "reqwest-client"))]
    #[test]
    fn test_default_factory_builds_reqwest_client() {
        let options = OtlpExporterOptions::default();
        assert!(HttpClientFactory::default().create(&options).is_ok());
    }

    #[cfg(all(
        feature = "tls",
        any(feature = "reqwest-blocking-client", feature = "reqwest-client")
    ))]
    #[test]
    fn test_default_factory_builds_mtls_client() {
        let options = OtlpExporterOptions::default().with_tls(crate::tls::tests::mtls_options());
        assert!(HttpClientFactory::default().create(&options).is_ok());
    }

    // The blocking client finishes a request within a single poll and needs
    // no async runtime, which is what lets a batch processor drive it from a
    // plain thread. It must stay the default even with `reqwest-client` on.
    #[cfg(feature = "reqwest-blocking-client")]
    #[test]
    fn test_default_factory_prefers_blocking_client() {
        use std::task::{Context, Poll, Wake, Waker};

        struct NoopWaker;

        impl Wake for NoopWaker {
            fn wake(self: Arc<Self>) {}
        }

        let closed_port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let options = OtlpExporterOptions::default().with_timeout(Duration::from_secs(2));
        let client = HttpClientFactory::default().create(&options).unwrap();
        let request = Request::builder()
            .uri(format!("http://127.0.0.1:{closed_port}/v1/traces"))
            .body(Bytes::from_static(b"payload"))
            .unwrap();

        let waker = Waker::from(Arc::new(NoopWaker));
        let mut cx = Context::from_waker(&waker);
        let mut send = client.send_bytes(request);
        assert!(matches!(send.as_mut().poll(&mut cx), Poll::Ready(Err(_))));
    }

    #[cfg(any(feature = "reqwest-blocking-client", feature = "reqwest-client"))]
    #[tokio::test]
    async fn test_default_factory_inside_async_runtime() {
        let options = OtlpExporterOptions::default();
        let client = HttpClientFactory::default().create(&options).unwrap();
        // a blocking client must not be dropped on a runtime thread
        std::thread::spawn(move || drop(client)).join().unwrap();
    }

    #[cfg(all(
        feature = "tls",
        any(feature = "reqwest-blocking-client", feature = "reqwest-client")
    ))]
    #[test]
    fn test_default_factory_surfaces_tls_errors() {
        let options = OtlpExporterOptions::default().with_tls(
            crate::TlsOptions::default()
                .with_client_certificate_file(crate::tls::tests::fixture("client.pem")),
        );
        assert!(matches!(
            HttpClientFactory::default().create(&options),
            Err(crate::OtlpOptionsError::InvalidConfig { .. })
        ));
    }
}
