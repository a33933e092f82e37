// Request signing
//
// Every call to the vendor API carries a `ts` (unix seconds) and a `sign`
// header: MD5 over `appid + path + ts`, lower-case hex. The path is the
// request path without its query string. Digest and concatenation order are
// part of the wire format.

use md5::{Digest, Md5};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Application identifier baked into the vendor's mobile app.
pub const APP_ID: &str = "a0baae0630f444b0811ea3c2eb212179";
/// Value of the `version` header.
pub const API_VERSION: &str = "1.0.0";
/// Value of the `platform` header.
pub const PLATFORM: &str = "ios";
/// User agent of the mobile app the API expects.
pub const USER_AGENT: &str =
    "Furbulous/2.0.1 (com.furbulous.pet; build:202507031750; iOS 26.0.1) Alamofire/4.9.1";

const HEADER_APP_ID: &str = "appid";
const HEADER_VERSION: &str = "version";
const HEADER_PLATFORM: &str = "platform";
const HEADER_TIMESTAMP: &str = "ts";
const HEADER_SIGN: &str = "sign";

/// Compute the request signature for `path` at `timestamp`.
///
/// Any query string on `path` is ignored, so callers may pass either the
/// bare path or the full endpoint.
pub fn sign(timestamp: i64, path: &str) -> String {
    let path = strip_query(path);
    let mut hasher = Md5::new();
    hasher.update(APP_ID.as_bytes());
    hasher.update(path.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(base, _)| base)
}

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// One outbound call's signing material.
///
/// Recomputed for every request; the signature embeds the timestamp so a
/// value must never be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub timestamp: i64,
    pub signature: String,
}

impl SignedRequest {
    /// Sign `path` with the current time.
    pub fn now(method: Method, path: &str) -> Self {
        Self::at(method, path, unix_now())
    }

    /// Sign `path` at a fixed timestamp.
    pub fn at(method: Method, path: &str, timestamp: i64) -> Self {
        let path = strip_query(path).to_owned();
        let signature = sign(timestamp, &path);
        Self {
            method,
            path,
            timestamp,
            signature,
        }
    }

    /// The full header set for this request.
    ///
    /// `token` is attached as the raw `authorization` value (no scheme
    /// prefix) and marked sensitive so it never shows up in debug output.
    /// Login requests pass `None`.
    pub fn headers(&self, token: Option<&SecretString>) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
        headers.insert(HEADER_APP_ID, HeaderValue::from_static(APP_ID));
        headers.insert(HEADER_VERSION, HeaderValue::from_static(API_VERSION));
        headers.insert(HEADER_PLATFORM, HeaderValue::from_static(PLATFORM));
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(HEADER_TIMESTAMP, HeaderValue::from(self.timestamp));
        headers.insert(
            HEADER_SIGN,
            HeaderValue::from_str(&self.signature).map_err(|e| Error::Client(e.to_string()))?,
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token.expose_secret()).map_err(|e| {
                Error::Authentication {
                    message: format!("invalid token header value: {e}"),
                }
            })?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        Ok(headers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Digests captured from the vendor app for known (path, ts) pairs.
    const LOGIN_1700000000: &str = "f98e202704e72e5ed7781f7edac7d674";
    const DEVICE_LIST_1700000000: &str = "96d79bc95621a67661ca675199d1aaf7";
    const DEVICE_LIST_1700000001: &str = "a61a78a7ae57374e17715e5c57dda8c7";
    const PROPERTIES_GET_1760000000: &str = "04db4319d9c5867e05a694486c98befd";

    #[test]
    fn matches_captured_signatures() {
        assert_eq!(sign(1_700_000_000, "/app/v1/auth/login"), LOGIN_1700000000);
        assert_eq!(
            sign(1_700_000_000, "/app/v1/device/list"),
            DEVICE_LIST_1700000000
        );
        assert_eq!(
            sign(1_760_000_000, "/app/v1/device/properties/get"),
            PROPERTIES_GET_1760000000
        );
    }

    #[test]
    fn is_deterministic_and_input_sensitive() {
        let a = sign(1_700_000_000, "/app/v1/device/list");
        let b = sign(1_700_000_000, "/app/v1/device/list");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        assert_eq!(
            sign(1_700_000_001, "/app/v1/device/list"),
            DEVICE_LIST_1700000001
        );
        assert_ne!(a, sign(1_700_000_000, "/app/v1/device/lisT"));
    }

    #[test]
    fn query_string_is_not_signed() {
        assert_eq!(
            sign(
                1_760_000_000,
                "/app/v1/device/properties/get?iotid=849DC2F4F30B"
            ),
            PROPERTIES_GET_1760000000
        );
    }

    #[test]
    fn headers_carry_signature_and_token() {
        let signed = SignedRequest::at(Method::GET, "/app/v1/device/list", 1_700_000_000);
        let token = SecretString::from("abc123".to_string());
        let headers = signed.headers(Some(&token)).unwrap();

        assert_eq!(headers["sign"], DEVICE_LIST_1700000000);
        assert_eq!(headers["ts"], "1700000000");
        assert_eq!(headers["appid"], APP_ID);
        assert_eq!(headers["version"], API_VERSION);
        assert_eq!(headers["platform"], PLATFORM);
        assert_eq!(headers["authorization"], "abc123");
        assert!(headers["authorization"].is_sensitive());
    }

    #[test]
    fn login_headers_have_no_authorization() {
        let signed = SignedRequest::at(Method::POST, "/app/v1/auth/login", 1_700_000_000);
        let headers = signed.headers(None).unwrap();
        assert!(headers.get("authorization").is_none());
        assert_eq!(headers["sign"], LOGIN_1700000000);
    }
}
