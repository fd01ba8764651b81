use crate::OtlpOptionsError;
use http::Uri;
use opentelemetry::otel_warn;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Protocol the exporter will use. Either `http/protobuf` or `grpc`.
pub const OTEL_EXPORTER_OTLP_PROTOCOL: &str = "OTEL_EXPORTER_OTLP_PROTOCOL";
/// Protocol value for HTTP with protobuf encoding
pub const OTEL_EXPORTER_OTLP_PROTOCOL_HTTP_PROTOBUF: &str = "http/protobuf";
/// Protocol value for gRPC
pub const OTEL_EXPORTER_OTLP_PROTOCOL_GRPC: &str = "grpc";

// Endpoints per protocol https://github.com/open-telemetry/opentelemetry-specification/blob/main/specification/protocol/exporter.md
pub(crate) const OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT: &str = "http://localhost:4317";
pub(crate) const OTEL_EXPORTER_OTLP_HTTP_ENDPOINT_DEFAULT: &str = "http://localhost:4318";

/// The communication protocol to use when exporting data.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Protocol {
    /// GRPC protocol
    #[default]
    Grpc,
    /// HTTP protocol with binary protobuf
    HttpProtobuf,
}

impl Protocol {
    /// Read the protocol from `OTEL_EXPORTER_OTLP_PROTOCOL`.
    ///
    /// Returns `None` if the variable is unset or holds an unsupported value.
    pub fn from_env() -> Option<Self> {
        Self::from_env_var(OTEL_EXPORTER_OTLP_PROTOCOL)
    }

    pub(crate) fn from_env_var(var: &str) -> Option<Self> {
        let value = std::env::var(var).ok()?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match value.parse() {
            Ok(protocol) => Some(protocol),
            Err(err) => {
                otel_warn!(
                    name: "OtlpOptions.InvalidProtocol",
                    variable = var.to_string(),
                    message = err.to_string()
                );
                None
            }
        }
    }

    /// The endpoint used when none has been configured.
    pub fn default_endpoint(&self) -> Uri {
        match self {
            Protocol::Grpc => Uri::from_static(OTEL_EXPORTER_OTLP_GRPC_ENDPOINT_DEFAULT),
            Protocol::HttpProtobuf => Uri::from_static(OTEL_EXPORTER_OTLP_HTTP_ENDPOINT_DEFAULT),
        }
    }
}

impl FromStr for Protocol {
    type Err = OtlpOptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            OTEL_EXPORTER_OTLP_PROTOCOL_GRPC => Ok(Protocol::Grpc),
            OTEL_EXPORTER_OTLP_PROTOCOL_HTTP_PROTOBUF => Ok(Protocol::HttpProtobuf),
            _ => Err(OtlpOptionsError::UnsupportedProtocol(s.to_string())),
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Grpc => write!(f, "{OTEL_EXPORTER_OTLP_PROTOCOL_GRPC}"),
            Protocol::HttpProtobuf => write!(f, "{OTEL_EXPORTER_OTLP_PROTOCOL_HTTP_PROTOBUF}"),
        }
    }
}
