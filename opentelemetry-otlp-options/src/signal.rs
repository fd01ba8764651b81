//! Per-signal overrides.
//!
//! Every generic `OTEL_EXPORTER_OTLP_*` variable has a signal specific
//! counterpart which wins over it when options are built for that signal.

use std::fmt::{Display, Formatter};

/// Target to which the exporter is going to send spans, used as-is without
/// appending a signal path.
pub const OTEL_EXPORTER_OTLP_TRACES_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";
/// Key-value pairs to be used as headers associated with span exports.
pub const OTEL_EXPORTER_OTLP_TRACES_HEADERS: &str = "OTEL_EXPORTER_OTLP_TRACES_HEADERS";
/// Max waiting time for the backend to process each spans batch, in milliseconds.
pub const OTEL_EXPORTER_OTLP_TRACES_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TRACES_TIMEOUT";
/// Protocol used to export spans.
pub const OTEL_EXPORTER_OTLP_TRACES_PROTOCOL: &str = "OTEL_EXPORTER_OTLP_TRACES_PROTOCOL";

/// Target to which the exporter is going to send metrics, used as-is without
/// appending a signal path.
pub const OTEL_EXPORTER_OTLP_METRICS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_METRICS_ENDPOINT";
/// Key-value pairs to be used as headers associated with metric exports.
pub const OTEL_EXPORTER_OTLP_METRICS_HEADERS: &str = "OTEL_EXPORTER_OTLP_METRICS_HEADERS";
/// Max waiting time for the backend to process each metrics batch, in milliseconds.
pub const OTEL_EXPORTER_OTLP_METRICS_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_METRICS_TIMEOUT";
/// Protocol used to export metrics.
pub const OTEL_EXPORTER_OTLP_METRICS_PROTOCOL: &str = "OTEL_EXPORTER_OTLP_METRICS_PROTOCOL";

/// Target to which the exporter is going to send logs, used as-is without
/// appending a signal path.
pub const OTEL_EXPORTER_OTLP_LOGS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_LOGS_ENDPOINT";
/// Key-value pairs to be used as headers associated with log exports.
pub const OTEL_EXPORTER_OTLP_LOGS_HEADERS: &str = "OTEL_EXPORTER_OTLP_LOGS_HEADERS";
/// Max waiting time for the backend to process each logs batch, in milliseconds.
pub const OTEL_EXPORTER_OTLP_LOGS_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_LOGS_TIMEOUT";
/// Protocol used to export logs.
pub const OTEL_EXPORTER_OTLP_LOGS_PROTOCOL: &str = "OTEL_EXPORTER_OTLP_LOGS_PROTOCOL";

/// The telemetry signal an exporter is configured for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Signal {
    /// Spans.
    Traces,
    /// Metrics.
    Metrics,
    /// Log records.
    Logs,
}

impl Signal {
    /// The path appended to a base endpoint for OTLP/HTTP.
    ///
    /// See <https://github.com/open-telemetry/opentelemetry-specification/blob/main/specification/protocol/exporter.md#endpoint-urls-for-otlphttp>
    pub fn http_path(&self) -> &'static str {
        match self {
            Signal::Traces => "/v1/traces",
            Signal::Metrics => "/v1/metrics",
            Signal::Logs => "/v1/logs",
        }
    }

    pub(crate) fn endpoint_var(&self) -> &'static str {
        match self {
            Signal::Traces => OTEL_EXPORTER_OTLP_TRACES_ENDPOINT,
            Signal::Metrics => OTEL_EXPORTER_OTLP_METRICS_ENDPOINT,
            Signal::Logs => OTEL_EXPORTER_OTLP_LOGS_ENDPOINT,
        }
    }

    pub(crate) fn headers_var(&self) -> &'static str {
        match self {
            Signal::Traces => OTEL_EXPORTER_OTLP_TRACES_HEADERS,
            Signal::Metrics => OTEL_EXPORTER_OTLP_METRICS_HEADERS,
            Signal::Logs => OTEL_EXPORTER_OTLP_LOGS_HEADERS,
        }
    }

    pub(crate) fn timeout_var(&self) -> &'static str {
        match self {
            Signal::Traces => OTEL_EXPORTER_OTLP_TRACES_TIMEOUT,
            Signal::Metrics => OTEL_EXPORTER_OTLP_METRICS_TIMEOUT,
            Signal::Logs => OTEL_EXPORTER_OTLP_LOGS_TIMEOUT,
        }
    }

    pub(crate) fn protocol_var(&self) -> &'static str {
        match self {
            Signal::Traces => OTEL_EXPORTER_OTLP_TRACES_PROTOCOL,
            Signal::Metrics => OTEL_EXPORTER_OTLP_METRICS_PROTOCOL,
            Signal::Logs => OTEL_EXPORTER_OTLP_LOGS_PROTOCOL,
        }
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Traces => write!(f, "traces"),
            Signal::Metrics => write!(f, "metrics"),
            Signal::Logs => write!(f, "logs"),
        }
    }
}
