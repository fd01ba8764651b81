//! The OTLP exporter options holder.
//!
//! Values are resolved in this order, later steps overriding earlier ones:
//! 1. built-in defaults,
//! 2. generic `OTEL_EXPORTER_OTLP_*` environment variables, read at construction,
//! 3. signal specific environment variables when built with [`OtlpExporterOptions::for_signal`],
//! 4. programmatic setters, in call order.

#[cfg(feature = "http-proto")]
use crate::HttpClientFactory;
use crate::{
    headers, BatchExportProcessorOptions, ExportProcessorType, OtlpOptionsError, Protocol, Signal,
    TlsOptions, OTEL_EXPORTER_OTLP_PROTOCOL,
};
use http::{HeaderMap, Uri};
use opentelemetry::{otel_debug, otel_warn};
#[cfg(feature = "http-proto")]
use opentelemetry_http::HttpClient;
#[cfg(feature = "http-proto")]
use std::sync::Arc;
use std::time::Duration;

/// Target to which the exporter is going to send signals. For OTLP/HTTP the
/// signal path (e.g. `/v1/traces`) is appended to it.
pub const OTEL_EXPORTER_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Key-value pairs to be used as headers associated with gRPC or HTTP requests
/// Example: `k1=v1,k2=v2`
pub const OTEL_EXPORTER_OTLP_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";
/// Max waiting time for the backend to process each signal batch, in milliseconds.
pub const OTEL_EXPORTER_OTLP_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TIMEOUT";
/// Default max waiting time for the backend to process each signal batch.
pub const OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT: Duration = Duration::from_millis(10_000);

/// Configuration for an OTLP exporter.
///
/// ## Examples
///
/// ```
/// use opentelemetry_otlp_options::{OtlpExporterOptions, Protocol, Signal};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), opentelemetry_otlp_options::OtlpOptionsError> {
/// let options = OtlpExporterOptions::for_signal(Signal::Traces)
///     .with_protocol(Protocol::HttpProtobuf)
///     .with_timeout(Duration::from_secs(5));
///
/// let endpoint = options.signal_endpoint(Signal::Traces)?;
/// # let _ = endpoint;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct OtlpExporterOptions {
    endpoint: Option<Uri>,
    append_signal_path: bool,
    headers: Option<String>,
    timeout: Duration,
    protocol: Protocol,
    signal: Option<Signal>,
    export_processor_type: ExportProcessorType,
    batch_export_processor_options: BatchExportProcessorOptions,
    tls: TlsOptions,
    #[cfg(feature = "http-proto")]
    http_client_factory: Option<HttpClientFactory>,
}

impl Default for OtlpExporterOptions {
    fn default() -> Self {
        OtlpExporterOptions::new()
    }
}

impl OtlpExporterOptions {
    /// Create options from the built-in defaults and the generic
    /// `OTEL_EXPORTER_OTLP_*`, `OTEL_BSP_*` and TLS environment variables.
    pub fn new() -> Self {
        let mut options = OtlpExporterOptions {
            endpoint: None,
            append_signal_path: true,
            headers: None,
            timeout: OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT,
            protocol: Protocol::default(),
            signal: None,
            export_processor_type: ExportProcessorType::default(),
            batch_export_processor_options: BatchExportProcessorOptions::default(),
            tls: TlsOptions::from_env(),
            #[cfg(feature = "http-proto")]
            http_client_factory: None,
        };
        options.apply_env_vars(
            OTEL_EXPORTER_OTLP_ENDPOINT,
            OTEL_EXPORTER_OTLP_HEADERS,
            OTEL_EXPORTER_OTLP_TIMEOUT,
            OTEL_EXPORTER_OTLP_PROTOCOL,
        );
        // a generic endpoint is a base URL, signal paths are appended to it
        options.append_signal_path = true;
        options
    }

    /// Create options for one signal: the generic environment variables are
    /// read first, then the signal specific ones (e.g.
    /// `OTEL_EXPORTER_OTLP_TRACES_ENDPOINT`) override them.
    ///
    /// A signal specific endpoint is used verbatim, no signal path is appended.
    pub fn for_signal(signal: Signal) -> Self {
        let mut options = OtlpExporterOptions::new();
        options.signal = Some(signal);
        options.apply_env_vars(
            signal.endpoint_var(),
            signal.headers_var(),
            signal.timeout_var(),
            signal.protocol_var(),
        );
        otel_debug!(
            name: "OtlpOptions.Resolved",
            signal = signal.to_string(),
            endpoint = options.endpoint().to_string(),
            protocol = options.protocol.to_string(),
            timeout_in_millisecs = options.timeout.as_millis()
        );
        options
    }

    fn apply_env_vars(
        &mut self,
        endpoint_var: &str,
        headers_var: &str,
        timeout_var: &str,
        protocol_var: &str,
    ) {
        if let Some(endpoint) = env_var(endpoint_var) {
            match endpoint.parse::<Uri>() {
                Ok(uri) => {
                    self.endpoint = Some(uri);
                    self.append_signal_path = false;
                }
                Err(err) => {
                    otel_warn!(
                        name: "OtlpOptions.InvalidEndpoint",
                        variable = endpoint_var.to_string(),
                        message = err.to_string()
                    );
                }
            }
        }

        if let Some(headers) = env_var(headers_var) {
            self.headers = Some(headers);
        }

        if let Some(timeout) = env_var(timeout_var) {
            match timeout.parse::<u64>() {
                Ok(millis) => self.timeout = Duration::from_millis(millis),
                Err(err) => {
                    otel_warn!(
                        name: "OtlpOptions.InvalidTimeout",
                        variable = timeout_var.to_string(),
                        message = err.to_string()
                    );
                }
            }
        }

        if let Some(protocol) = Protocol::from_env_var(protocol_var) {
            self.protocol = protocol;
        }
    }

    /// The signal these options were built for, if any.
    pub fn signal(&self) -> Option<Signal> {
        self.signal
    }

    /// The collector endpoint.
    ///
    /// When no endpoint has been configured, the default for the current
    /// [`protocol`](Self::protocol) is returned: `http://localhost:4317` for
    /// gRPC and `http://localhost:4318` for HTTP.
    pub fn endpoint(&self) -> Uri {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.protocol.default_endpoint())
    }

    /// The endpoint an exporter for `signal` sends to.
    ///
    /// For OTLP/HTTP the signal path is appended unless the endpoint was set
    /// programmatically or through a signal specific environment variable.
    /// gRPC endpoints are returned unchanged since the path is derived from
    /// the service definition.
    ///
    /// Options built with [`for_signal`](Self::for_signal) only resolve
    /// endpoints for that signal, any other signal is an
    /// [`OtlpOptionsError::InvalidConfig`].
    pub fn signal_endpoint(&self, signal: Signal) -> Result<Uri, OtlpOptionsError> {
        if let Some(configured) = self.signal.filter(|configured| *configured != signal) {
            return Err(OtlpOptionsError::InvalidConfig {
                name: "signal".to_string(),
                reason: format!("options were built for {configured}, not {signal}"),
            });
        }
        let endpoint = self.endpoint();
        match self.protocol {
            Protocol::HttpProtobuf if self.append_signal_path => {
                build_endpoint_uri(&endpoint.to_string(), signal.http_path())
            }
            _ => Ok(endpoint),
        }
    }

    /// Set the address of the collector. The value is used as-is, no signal
    /// path is appended to it.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<(), OtlpOptionsError> {
        let uri = endpoint
            .parse::<Uri>()
            .map_err(|err| OtlpOptionsError::InvalidUri(endpoint.to_string(), err.to_string()))?;
        self.endpoint = Some(uri);
        self.append_signal_path = false;
        Ok(())
    }

    /// Builder form of [`set_endpoint`](Self::set_endpoint).
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, OtlpOptionsError> {
        self.set_endpoint(endpoint)?;
        Ok(self)
    }

    /// The raw `k1=v1,k2=v2` header list, if any.
    pub fn headers(&self) -> Option<&str> {
        self.headers.as_deref()
    }

    /// Replace the header list.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn set_headers(&mut self, headers: impl Into<String>) {
        self.headers = Some(headers.into());
    }

    /// Builder form of [`set_headers`](Self::set_headers).
    pub fn with_headers(mut self, headers: impl Into<String>) -> Self {
        self.set_headers(headers);
        self
    }

    /// The headers sent with every export: a default `User-Agent` merged with
    /// the parsed header list. Entries that are not valid HTTP headers are
    /// skipped.
    pub fn header_map(&self) -> HeaderMap {
        let mut headers = headers::default_headers();
        if let Some(input) = &self.headers {
            headers::add_header_from_string(input, &mut headers);
        }
        headers
    }

    /// Max waiting time for the backend to process each batch.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the export timeout.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Builder form of [`set_timeout`](Self::set_timeout).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    /// The transport protocol.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Set the transport protocol. If no endpoint has been configured the
    /// default endpoint follows the new protocol.
    ///
    /// Note: Programmatically setting this will override any value set via the environment variable.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    /// Builder form of [`set_protocol`](Self::set_protocol).
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.set_protocol(protocol);
        self
    }

    /// Whether items are exported one by one or in batches.
    pub fn export_processor_type(&self) -> ExportProcessorType {
        self.export_processor_type
    }

    /// Set the export processor type.
    pub fn set_export_processor_type(&mut self, export_processor_type: ExportProcessorType) {
        self.export_processor_type = export_processor_type;
    }

    /// Builder form of [`set_export_processor_type`](Self::set_export_processor_type).
    pub fn with_export_processor_type(mut self, export_processor_type: ExportProcessorType) -> Self {
        self.set_export_processor_type(export_processor_type);
        self
    }

    /// Settings for the batch export processor. Only meaningful when
    /// [`export_processor_type`](Self::export_processor_type) is
    /// [`ExportProcessorType::Batch`].
    pub fn batch_export_processor_options(&self) -> &BatchExportProcessorOptions {
        &self.batch_export_processor_options
    }

    /// Mutable access to the batch export processor settings.
    pub fn batch_export_processor_options_mut(&mut self) -> &mut BatchExportProcessorOptions {
        &mut self.batch_export_processor_options
    }

    /// Replace the batch export processor settings.
    pub fn set_batch_export_processor_options(&mut self, options: BatchExportProcessorOptions) {
        self.batch_export_processor_options = options;
    }

    /// Builder form of [`set_batch_export_processor_options`](Self::set_batch_export_processor_options).
    pub fn with_batch_export_processor_options(
        mut self,
        options: BatchExportProcessorOptions,
    ) -> Self {
        self.set_batch_export_processor_options(options);
        self
    }

    /// TLS file locations.
    pub fn tls(&self) -> &TlsOptions {
        &self.tls
    }

    /// Replace the TLS file locations.
    pub fn set_tls(&mut self, tls: TlsOptions) {
        self.tls = tls;
    }

    /// Builder form of [`set_tls`](Self::set_tls).
    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.set_tls(tls);
        self
    }

    /// The factory used to create the HTTP client: the one configured with
    /// [`with_http_client_factory`](Self::with_http_client_factory), or the
    /// default factory building a `reqwest` client from these options.
    #[cfg(feature = "http-proto")]
    pub fn http_client_factory(&self) -> HttpClientFactory {
        self.http_client_factory.clone().unwrap_or_default()
    }

    /// Replace the HTTP client factory.
    #[cfg(feature = "http-proto")]
    pub fn set_http_client_factory(&mut self, factory: HttpClientFactory) {
        self.http_client_factory = Some(factory);
    }

    /// Builder form of [`set_http_client_factory`](Self::set_http_client_factory).
    #[cfg(feature = "http-proto")]
    pub fn with_http_client_factory(mut self, factory: HttpClientFactory) -> Self {
        self.set_http_client_factory(factory);
        self
    }

    /// Assign client implementation
    #[cfg(feature = "http-proto")]
    pub fn with_http_client<T: HttpClient + 'static>(self, client: T) -> Self {
        self.with_http_client_factory(HttpClientFactory::from_client(client))
    }

    /// Create the HTTP client through the configured factory.
    #[cfg(feature = "http-proto")]
    pub fn build_http_client(&self) -> Result<Arc<dyn HttpClient>, OtlpOptionsError> {
        self.http_client_factory().create(self)
    }

    /// A lazily connecting tonic endpoint for the configured collector,
    /// carrying the timeout and the TLS credentials.
    #[cfg(feature = "grpc-tonic")]
    pub fn grpc_endpoint(&self) -> Result<tonic::transport::Endpoint, OtlpOptionsError> {
        let uri = self.endpoint().to_string();
        let endpoint = tonic::transport::Channel::from_shared(uri.clone())
            .map_err(|err| OtlpOptionsError::InvalidUri(uri.clone(), err.to_string()))?
            .timeout(self.timeout);

        #[cfg(feature = "tls")]
        let endpoint = match self.tls.load_credentials()? {
            Some(credentials) => endpoint.tls_config(credentials.tonic_tls_config())?,
            None => endpoint,
        };

        #[cfg(not(feature = "tls"))]
        if self.tls.is_configured() {
            return Err(OtlpOptionsError::TlsUnsupported("tls"));
        }

        otel_debug!(
            name: "OtlpOptions.GrpcEndpointBuilt",
            endpoint = uri.as_str(),
            timeout_in_millisecs = self.timeout.as_millis()
        );
        Ok(endpoint)
    }

    /// The header list as gRPC metadata.
    #[cfg(feature = "grpc-tonic")]
    pub fn grpc_metadata(&self) -> tonic::metadata::MetadataMap {
        tonic::metadata::MetadataMap::from_headers(self.header_map())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn build_endpoint_uri(endpoint: &str, path: &str) -> Result<Uri, OtlpOptionsError> {
    let path = if endpoint.ends_with('/') && path.starts_with('/') {
        &path[1..]
    } else {
        path
    };
    let uri = format!("{endpoint}{path}");
    uri.parse()
        .map_err(|err: http::uri::InvalidUri| OtlpOptionsError::InvalidUri(uri, err.to_string()))
}
