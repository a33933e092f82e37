// Furbulous API HTTP client
//
// Wraps `reqwest::Client` with URL construction, signed headers, envelope
// unwrapping and the single re-authenticate-and-retry policy. Endpoint
// groups (auth, devices, pets, snapshot) are inherent methods in separate
// files so this module stays focused on transport mechanics.

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Credentials, Session};
use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://app.api.us.furbulouspet.com:1443";

/// Async client for the Furbulous pet cloud.
///
/// One instance owns exactly one session. Concurrent callers (e.g. two
/// polling cadences) share it; token refresh is serialized so a burst of
/// rejected requests triggers a single login.
#[derive(Debug)]
pub struct FurbulousClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) session: RwLock<Session>,
    /// Held for the whole duration of a login.
    pub(crate) auth_gate: Mutex<()>,
}

impl FurbulousClient {
    /// Create a client against the production host.
    pub fn new(credentials: Credentials, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Self::with_base_url(base_url, credentials, transport)
    }

    /// Create a client against an explicit host (staging, test servers).
    pub fn with_base_url(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        let session = Session::from_credentials(&credentials);
        Self {
            http,
            base_url,
            credentials,
            session: RwLock::new(session),
            auth_gate: Mutex::new(()),
        }
    }

    /// The API host.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute API path onto the base URL and append the query.
    pub(crate) fn api_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // ── Request execution ────────────────────────────────────────────

    /// Run `request` and return the envelope's `data` on success.
    ///
    /// A token failure (in-band code/message or HTTP 401) triggers exactly
    /// one re-authentication followed by exactly one retry; whatever the
    /// retry yields is final. After the retry, an in-band token failure is
    /// reported as `Error::Api` and an HTTP 401 as `Error::Authentication`.
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Value, Error> {
        let (token, error) = match self.attempt(request).await? {
            Attempt::Success(data) => return Ok(data),
            Attempt::TokenRejected { token, error } => (token, error),
        };

        warn!(path = request.path, %error, "token rejected, re-authenticating");
        self.reauthenticate(&token).await?;

        match self.attempt(request).await? {
            Attempt::Success(data) => Ok(data),
            Attempt::TokenRejected {
                error: Error::Http { status, .. },
                ..
            } => Err(Error::Authentication {
                message: format!("request still rejected with HTTP {status} after re-authentication"),
            }),
            Attempt::TokenRejected { error, .. } => {
                warn!(path = request.path, %error, "request failed even after re-authentication");
                Err(error)
            }
        }
    }

    /// One signed round trip. Never retries.
    async fn attempt(&self, request: &ApiRequest) -> Result<Attempt, Error> {
        let (headers, token) = self
            .authorized_headers(&request.method, request.path)
            .await?;
        let url = self.api_url(request.path, &request.query)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Attempt::TokenRejected {
                token,
                error: Error::Http {
                    status: status.as_u16(),
                    message: "token rejected".into(),
                },
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if envelope.is_success() {
            return Ok(Attempt::Success(envelope.data));
        }

        let error = Error::Api {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        };
        if error.is_token_failure() {
            Ok(Attempt::TokenRejected { token, error })
        } else {
            Err(error)
        }
    }
}

/// Outcome of a single attempt that did not fail outright.
enum Attempt {
    Success(Value),
    /// The server refused `token`; eligible for one refresh-and-retry.
    TokenRejected { token: SecretString, error: Error },
}

/// A request description that can be replayed verbatim on retry.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub method: Method,
    /// Absolute path without query string; this is what gets signed.
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn put(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::PUT,
            path,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}
