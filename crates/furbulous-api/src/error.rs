use thiserror::Error;

/// Top-level error type for the `furbulous-api` crate.
///
/// Mirrors the failure taxonomy of the vendor API: session establishment,
/// in-band envelope failures, HTTP-level failures and transport problems.
/// `furbulous-core` maps these into poll outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// A session could not be established: bad credentials, a login
    /// response without a token, any transport failure during login, or a
    /// request rejected with HTTP 401 even after re-authenticating.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── API envelope ────────────────────────────────────────────────
    /// Non-zero `code` in the `{code, message, data}` envelope.
    #[error("API error (code {}): {message}", display_code(.code))]
    Api { code: Option<i64>, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Non-2xx HTTP status other than 401.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

#[allow(clippy::ref_option)]
fn display_code(code: &Option<i64>) -> String {
    code.map_or_else(|| "missing".into(), |c| c.to_string())
}

/// Envelope codes the vendor uses for an expired or invalid token.
pub(crate) const TOKEN_ERROR_CODES: [i64; 3] = [401, 10401, 10402];

/// Message fragments that mark a token failure. The vendor sometimes
/// localizes the message ("无效的 Token" = "invalid token").
const TOKEN_ERROR_MARKERS: [&str; 2] = ["token", "无效的"];

/// Classify an envelope failure as a token failure.
pub(crate) fn is_token_failure(code: Option<i64>, message: &str) -> bool {
    if code.is_some_and(|c| TOKEN_ERROR_CODES.contains(&c)) {
        return true;
    }
    let lowered = message.to_lowercase();
    TOKEN_ERROR_MARKERS.iter().any(|m| lowered.contains(m))
}

impl Error {
    /// Returns `true` if this error says the bearer token is no longer valid.
    pub fn is_token_failure(&self) -> bool {
        match self {
            Self::Api { code, message } => is_token_failure(*code, message),
            Self::Http { status: 401, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if a session could not be (re-)established.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` for connectivity failures (timeout, DNS, refused
    /// connection, unexpected HTTP status).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { .. })
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Extract the envelope code, if this is an API error.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}
