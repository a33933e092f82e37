// Shared transport configuration for building reqwest::Client instances.
//
// The vendor cloud sits behind a public certificate, so the system store is
// the default; a custom CA exists for intercepting proxies and test rigs.

use std::path::PathBuf;
use std::time::Duration;

/// Fixed per-request timeout. Bounds every blocking call the client makes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(crate::signing::USER_AGENT);

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path).map_err(|e| {
                crate::error::Error::Client(format!("failed to read CA cert: {e}"))
            })?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| crate::error::Error::Client(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Client(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(matches!(config.tls, TlsMode::System));
    }

    #[test]
    fn missing_ca_file_is_a_client_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa("/nonexistent/furbulous-ca.pem".into()),
            ..TransportConfig::default()
        };
        let err = config.build_client().err();
        assert!(
            matches!(err, Some(crate::error::Error::Client(ref m)) if m.contains("CA cert")),
            "expected CA read failure, got {err:?}"
        );
    }
}
