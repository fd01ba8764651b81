use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors that can occur while configuring an OTLP exporter or materializing
/// the clients and credentials it needs.
// Non-exhaustive to allow for future expansion without breaking changes.
#[non_exhaustive]
pub enum OtlpOptionsError {
    /// Spawning a new thread failed.
    #[error("Spawning a new thread failed. Unable to create Reqwest-Blocking client.")]
    ThreadSpawnFailed,

    /// No Http client specified and no default client feature is enabled.
    #[error("no http client specified")]
    NoHttpClient,

    /// Unsupported protocol.
    #[error("unsupported protocol '{0}'")]
    UnsupportedProtocol(String),

    /// Invalid URI.
    #[error("invalid URI {0}. Reason {1}")]
    InvalidUri(String, String),

    /// Invalid configuration.
    #[error("{name}: {reason}")]
    InvalidConfig {
        /// The configuration name.
        name: String,
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// TLS credentials were configured but the crate was built without a TLS
    /// backend for the selected transport.
    #[error("TLS credentials require the '{0}' feature")]
    TlsUnsupported(&'static str),

    /// A certificate or key file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A certificate or key file does not contain PEM encoded data.
    #[error("{} does not contain a PEM encoded block", .0.display())]
    InvalidPem(PathBuf),

    /// Failed due to an internal error.
    /// The error message is intended for logging purposes only and should not
    /// be used to make programmatic decisions. It is implementation-specific
    /// and subject to change without notice. Consumers of this error should not
    /// rely on its content beyond logging.
    #[error("Reason: {0}")]
    InternalFailure(String),
}

#[cfg(any(feature = "reqwest-blocking-client", feature = "reqwest-client"))]
impl From<reqwest::Error> for OtlpOptionsError {
    fn from(value: reqwest::Error) -> Self {
        OtlpOptionsError::InternalFailure(value.to_string())
    }
}

#[cfg(feature = "grpc-tonic")]
impl From<tonic::transport::Error> for OtlpOptionsError {
    fn from(value: tonic::transport::Error) -> Self {
        OtlpOptionsError::InternalFailure(value.to_string())
    }
}
