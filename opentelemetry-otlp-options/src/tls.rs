//! TLS and mutual TLS credentials.
//!
//! Certificates and keys are configured as paths to PEM files and only read
//! when a client is built, so that rotating the files on disk is picked up by
//! the next client.

use crate::OtlpOptionsError;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::path::{Path, PathBuf};

/// Path to a PEM encoded certificate used to verify the collector's TLS
/// certificate.
pub const OTEL_EXPORTER_OTLP_CERTIFICATE: &str = "OTEL_EXPORTER_OTLP_CERTIFICATE";
/// Path to the PEM encoded client certificate used for mutual TLS.
pub const OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE: &str = "OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE";
/// Path to the PEM encoded private key of the client certificate.
pub const OTEL_EXPORTER_OTLP_CLIENT_KEY: &str = "OTEL_EXPORTER_OTLP_CLIENT_KEY";

/// Locations of the PEM files used to secure the connection to the collector.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TlsOptions {
    certificate_file: Option<PathBuf>,
    client_certificate_file: Option<PathBuf>,
    client_key_file: Option<PathBuf>,
}

impl TlsOptions {
    /// Read the file locations from `OTEL_EXPORTER_OTLP_CERTIFICATE`,
    /// `OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE` and `OTEL_EXPORTER_OTLP_CLIENT_KEY`.
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        TlsOptions {
            certificate_file: path_from_env(OTEL_EXPORTER_OTLP_CERTIFICATE),
            client_certificate_file: path_from_env(OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE),
            client_key_file: path_from_env(OTEL_EXPORTER_OTLP_CLIENT_KEY),
        }
    }

    /// Trust the CA certificate(s) in the PEM file at `path` when verifying
    /// the collector.
    pub fn with_certificate_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_file = Some(path.into());
        self
    }

    /// Present the certificate in the PEM file at `path` to the collector.
    /// Requires [`with_client_key_file`](Self::with_client_key_file).
    pub fn with_client_certificate_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_certificate_file = Some(path.into());
        self
    }

    /// The private key matching the client certificate.
    pub fn with_client_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_key_file = Some(path.into());
        self
    }

    /// The trusted CA certificate file, if any.
    pub fn certificate_file(&self) -> Option<&Path> {
        self.certificate_file.as_deref()
    }

    /// The client certificate file, if any.
    pub fn client_certificate_file(&self) -> Option<&Path> {
        self.client_certificate_file.as_deref()
    }

    /// The client key file, if any.
    pub fn client_key_file(&self) -> Option<&Path> {
        self.client_key_file.as_deref()
    }

    /// Whether any TLS file has been configured.
    pub fn is_configured(&self) -> bool {
        self.certificate_file.is_some()
            || self.client_certificate_file.is_some()
            || self.client_key_file.is_some()
    }

    /// Read the configured PEM files.
    ///
    /// Returns `Ok(None)` when nothing is configured. A client certificate
    /// without a key, or a key without a certificate, is rejected.
    pub fn load_credentials(&self) -> Result<Option<TlsCredentials>, OtlpOptionsError> {
        if !self.is_configured() {
            return Ok(None);
        }

        let ca_certificate = self
            .certificate_file
            .as_deref()
            .map(read_certificates)
            .transpose()?;

        let identity = match (&self.client_certificate_file, &self.client_key_file) {
            (Some(cert), Some(key)) => Some(ClientIdentity {
                certificate: read_certificates(cert)?,
                key: read_private_key(key)?,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(OtlpOptionsError::InvalidConfig {
                    name: OTEL_EXPORTER_OTLP_CLIENT_KEY.to_string(),
                    reason: "a client certificate was configured without its private key"
                        .to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(OtlpOptionsError::InvalidConfig {
                    name: OTEL_EXPORTER_OTLP_CLIENT_CERTIFICATE.to_string(),
                    reason: "a client key was configured without its certificate".to_string(),
                })
            }
        };

        Ok(Some(TlsCredentials {
            ca_certificate,
            identity,
        }))
    }
}

/// PEM encoded client certificate and private key.
#[derive(Clone)]
pub struct ClientIdentity {
    certificate: Vec<u8>,
    key: Vec<u8>,
}

impl ClientIdentity {
    /// The PEM encoded certificate chain.
    pub fn certificate_pem(&self) -> &[u8] {
        &self.certificate
    }

    /// The PEM encoded private key.
    pub fn key_pem(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificate", &format_args!("{} bytes", self.certificate.len()))
            .field("key", &"[redacted]")
            .finish()
    }
}

/// Credentials read from the files described by [`TlsOptions`].
#[derive(Clone, Debug)]
pub struct TlsCredentials {
    ca_certificate: Option<Vec<u8>>,
    identity: Option<ClientIdentity>,
}

impl TlsCredentials {
    /// The PEM encoded CA certificate(s) to trust.
    pub fn ca_certificate_pem(&self) -> Option<&[u8]> {
        self.ca_certificate.as_deref()
    }

    /// The client identity for mutual TLS.
    pub fn identity(&self) -> Option<&ClientIdentity> {
        self.identity.as_ref()
    }

    /// Convert the CA certificate into a [`reqwest::Certificate`].
    #[cfg(all(
        feature = "tls",
        any(feature = "reqwest-blocking-client", feature = "reqwest-client")
    ))]
    pub fn reqwest_root_certificate(
        &self,
    ) -> Result<Option<reqwest::Certificate>, OtlpOptionsError> {
        self.ca_certificate
            .as_deref()
            .map(reqwest::Certificate::from_pem)
            .transpose()
            .map_err(OtlpOptionsError::from)
    }

    /// Convert the client certificate and key into a [`reqwest::Identity`].
    #[cfg(all(
        feature = "tls",
        any(feature = "reqwest-blocking-client", feature = "reqwest-client")
    ))]
    pub fn reqwest_identity(&self) -> Result<Option<reqwest::Identity>, OtlpOptionsError> {
        self.identity
            .as_ref()
            .map(|identity| {
                // rustls expects the key and the certificate chain in one buffer
                let mut pem = Vec::with_capacity(identity.key.len() + identity.certificate.len() + 1);
                pem.extend_from_slice(&identity.key);
                pem.push(b'\n');
                pem.extend_from_slice(&identity.certificate);
                reqwest::Identity::from_pem(&pem)
            })
            .transpose()
            .map_err(OtlpOptionsError::from)
    }

    /// Build the tonic TLS configuration for these credentials.
    #[cfg(all(feature = "tls", feature = "grpc-tonic"))]
    pub fn tonic_tls_config(&self) -> tonic::transport::ClientTlsConfig {
        let mut config = tonic::transport::ClientTlsConfig::new();
        if let Some(ca) = &self.ca_certificate {
            config = config.ca_certificate(tonic::transport::Certificate::from_pem(ca));
        }
        if let Some(identity) = &self.identity {
            config = config.identity(tonic::transport::Identity::from_pem(
                &identity.certificate,
                &identity.key,
            ));
        }
        config
    }
}

fn path_from_env(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_file(path: &Path) -> Result<Vec<u8>, OtlpOptionsError> {
    std::fs::read(path).map_err(|source| OtlpOptionsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file holding one or more `CERTIFICATE` blocks. Blocks of other
/// kinds are skipped, a file without any certificate is rejected.
fn read_certificates(path: &Path) -> Result<Vec<u8>, OtlpOptionsError> {
    let contents = read_file(path)?;
    let mut certificates = 0;
    for certificate in CertificateDer::pem_slice_iter(&contents) {
        certificate.map_err(|_| OtlpOptionsError::InvalidPem(path.to_path_buf()))?;
        certificates += 1;
    }
    if certificates == 0 {
        return Err(OtlpOptionsError::InvalidPem(path.to_path_buf()));
    }
    Ok(contents)
}

/// Read a file holding a PKCS#1, PKCS#8 or SEC1 private key.
fn read_private_key(path: &Path) -> Result<Vec<u8>, OtlpOptionsError> {
    let contents = read_file(path)?;
    PrivateKeyDer::from_pem_slice(&contents)
        .map_err(|_| OtlpOptionsError::InvalidPem(path.to_path_buf()))?;
    Ok(contents)
}
