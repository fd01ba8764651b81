//! Configuration for OTLP exporters.
//!
//! [`OtlpExporterOptions`] gathers everything an OTLP exporter needs to know
//! before it can send data: where the collector is, which transport to use,
//! how long to wait, which headers and TLS credentials to present and how
//! exported items are batched. It also builds the HTTP client (or the tonic
//! endpoint) from those settings.
//!
//! # Environment variables
//!
//! Values are read once, when the options are constructed:
//!
//! | Variable | Default |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` (gRPC) or `http://localhost:4318` (HTTP) |
//! | `OTEL_EXPORTER_OTLP_HEADERS` | none |
//! | `OTEL_EXPORTER_OTLP_TIMEOUT` | `10000` (milliseconds) |
//! | `OTEL_EXPORTER_OTLP_PROTOCOL` | `grpc` |
//! | `OTEL_EXPORTER_OTLP_CERTIFICATE` | none |
//! | `OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE` | none |
//! | `OTEL_EXPORTER_OTLP_CLIENT_KEY` | none |
//! | `OTEL_BSP_*` | see [`BatchExportProcessorOptions`] |
//!
//! The endpoint, headers, timeout and protocol also have signal specific
//! variants (`OTEL_EXPORTER_OTLP_TRACES_ENDPOINT` and so on) which are
//! honored by [`OtlpExporterOptions::for_signal`].
//!
//! Anything set in code afterwards wins over the environment.
//!
//! # Example
//!
//! ```no_run
//! use opentelemetry_otlp_options::{OtlpExporterOptions, Protocol, Signal, TlsOptions};
//!
//! # fn main() -> Result<(), opentelemetry_otlp_options::OtlpOptionsError> {
//! let options = OtlpExporterOptions::for_signal(Signal::Logs)
//!     .with_protocol(Protocol::HttpProtobuf)
//!     .with_tls(
//!         TlsOptions::default()
//!             .with_certificate_file("/etc/otel/ca.pem")
//!             .with_client_certificate_file("/etc/otel/client.pem")
//!             .with_client_key_file("/etc/otel/client.key"),
//!     );
//!
//! let endpoint = options.signal_endpoint(Signal::Logs)?;
//! let client = options.build_http_client()?;
//! # let _ = (endpoint, client);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! * `grpc-tonic`: tonic endpoint and metadata helpers. Enabled by default.
//! * `http-proto`: HTTP client factory. Enabled by default.
//! * `reqwest-blocking-client`: default HTTP client built on `reqwest::blocking`. Enabled by default.
//! * `reqwest-client`: default HTTP client built on the async `reqwest` client.
//! * `tls`: rustls based TLS for whichever transports are enabled. Enabled by default.
//! * `trace`, `logs`: conversions into the `opentelemetry_sdk` batch configurations. Enabled by default.
//! * `internal-logs`: diagnostics through `tracing`. Enabled by default.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/opentelemetry-rust/main/assets/logo.svg"
)]
#![cfg_attr(test, deny(warnings))]

mod batch;
mod error;
mod headers;
#[cfg(feature = "http-proto")]
mod http_client;
mod options;
mod protocol;
mod signal;
mod tls;

pub use crate::batch::{
    BatchExportProcessorOptions, ExportProcessorType, OTEL_BSP_EXPORT_TIMEOUT,
    OTEL_BSP_EXPORT_TIMEOUT_DEFAULT, OTEL_BSP_MAX_EXPORT_BATCH_SIZE,
    OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT, OTEL_BSP_MAX_QUEUE_SIZE,
    OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT, OTEL_BSP_SCHEDULE_DELAY, OTEL_BSP_SCHEDULE_DELAY_DEFAULT,
};
pub use crate::error::OtlpOptionsError;
#[cfg(feature = "http-proto")]
pub use crate::http_client::HttpClientFactory;
pub use crate::options::{
    OtlpExporterOptions, OTEL_EXPORTER_OTLP_ENDPOINT, OTEL_EXPORTER_OTLP_HEADERS,
    OTEL_EXPORTER_OTLP_TIMEOUT, OTEL_EXPORTER_OTLP_TIMEOUT_DEFAULT,
};
pub use crate::protocol::{
    Protocol, OTEL_EXPORTER_OTLP_PROTOCOL, OTEL_EXPORTER_OTLP_PROTOCOL_GRPC,
    OTEL_EXPORTER_OTLP_PROTOCOL_HTTP_PROTOBUF,
};
pub use crate::signal::{
    Signal, OTEL_EXPORTER_OTLP_LOGS_ENDPOINT, OTEL_EXPORTER_OTLP_LOGS_HEADERS,
    OTEL_EXPORTER_OTLP_LOGS_PROTOCOL, OTEL_EXPORTER_OTLP_LOGS_TIMEOUT,
    OTEL_EXPORTER_OTLP_METRICS_ENDPOINT, OTEL_EXPORTER_OTLP_METRICS_HEADERS,
    OTEL_EXPORTER_OTLP_METRICS_PROTOCOL, OTEL_EXPORTER_OTLP_METRICS_TIMEOUT,
    OTEL_EXPORTER_OTLP_TRACES_ENDPOINT, OTEL_EXPORTER_OTLP_TRACES_HEADERS,
    OTEL_EXPORTER_OTLP_TRACES_PROTOCOL, OTEL_EXPORTER_OTLP_TRACES_TIMEOUT,
};
pub use crate::tls::{
    ClientIdentity, TlsCredentials, TlsOptions, OTEL_EXPORTER_OTLP_CERTIFICATE,
    OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE, OTEL_EXPORTER_OTLP_CLIENT_KEY,
};
