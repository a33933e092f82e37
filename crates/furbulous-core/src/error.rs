// ── Core error types ──
//
// User-facing errors from furbulous-core. Consumers never see HTTP
// statuses or envelope codes directly; the `From<furbulous_api::Error>`
// impl translates transport-layer errors into poll outcomes.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// Credentials were rejected or no session could be established.
    /// During setup this means "re-enter credentials"; during a poll it
    /// means "re-authentication needed".
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The first poll after authenticating did not succeed.
    #[error("Setup failed: {message}")]
    SetupFailed { message: String },

    // ── Connectivity errors ──────────────────────────────────────────
    #[error("Cannot reach the Furbulous cloud: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Envelope `code`, when the failure was in-band.
        code: Option<i64>,
        /// HTTP status, when the failure was out-of-band.
        status: Option<u16>,
    },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this failure needs new credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<furbulous_api::Error> for CoreError {
    fn from(err: furbulous_api::Error) -> Self {
        match err {
            furbulous_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            furbulous_api::Error::Api { code, message } => CoreError::Api {
                message,
                code,
                status: None,
            },
            furbulous_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                code: None,
                status: Some(status),
            },
            furbulous_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                }
            }
            furbulous_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            furbulous_api::Error::Client(message) => CoreError::Config { message },
            furbulous_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_to_auth_failure() {
        let err: CoreError = furbulous_api::Error::Authentication {
            message: "bad password".into(),
        }
        .into();
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Authentication failed: bad password");
    }

    #[test]
    fn data_and_http_errors_keep_their_codes() {
        let err: CoreError = furbulous_api::Error::Api {
            code: Some(2001),
            message: "busy".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { code: Some(2001), status: None, .. }));

        let err: CoreError = furbulous_api::Error::Http {
            status: 502,
            message: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
        assert!(!err.is_auth_error());
    }
}
