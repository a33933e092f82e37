// ── Runtime client configuration ──
//
// Describes *how* to reach the Furbulous cloud and how often to poll it.
// Carries credential data but never touches disk; `furbulous-config`
// builds one from file and environment and hands it in.

use std::time::Duration;

use furbulous_api::{Credentials, DEFAULT_BASE_URL, TransportConfig};
use url::Url;

/// General refresh cadence.
pub const DEFAULT_GENERAL_INTERVAL: Duration = Duration::from_secs(300);
/// Fast cadence, only there to catch short "cat present" windows.
pub const DEFAULT_FAST_INTERVAL: Duration = Duration::from_secs(20);

/// Configuration for one account.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host (production by default).
    pub base_url: Url,
    /// Token or account credentials.
    pub credentials: Credentials,
    /// HTTP transport tuning.
    pub transport: TransportConfig,
    /// Full refresh period. Zero disables the cadence.
    pub general_interval: Duration,
    /// Fast refresh period. Zero disables the cadence.
    pub fast_interval: Duration,
}

impl ClientConfig {
    /// Production host with default cadences.
    pub fn new(credentials: Credentials) -> Result<Self, url::ParseError> {
        Ok(Self::with_base_url(Url::parse(DEFAULT_BASE_URL)?, credentials))
    }

    pub fn with_base_url(base_url: Url, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            transport: TransportConfig::default(),
            general_interval: DEFAULT_GENERAL_INTERVAL,
            fast_interval: DEFAULT_FAST_INTERVAL,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_two_cadences() {
        let config = ClientConfig::new(Credentials::token("t")).unwrap();
        assert_eq!(config.general_interval, Duration::from_secs(300));
        assert_eq!(config.fast_interval, Duration::from_secs(20));
        assert_eq!(config.base_url.as_str(), "https://app.api.us.furbulouspet.com:1443/");
        assert_eq!(config.transport.timeout, Duration::from_secs(10));
    }
}
