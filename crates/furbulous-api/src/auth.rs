// Session management
//
// Login, bearer-token lifecycle and signed header construction. The token
// is replaced in place on re-authentication; no history is kept.

use reqwest::Method;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::client::FurbulousClient;
use crate::error::Error;
use crate::models::{Envelope, LoginData, LoginRequest};
use crate::signing::SignedRequest;

pub(crate) const LOGIN_PATH: &str = "/app/v1/auth/login";

/// Default `account_type` sent at login (email account).
pub const DEFAULT_ACCOUNT_TYPE: u8 = 1;

/// How the client obtains its bearer token.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A pre-obtained token. Cannot be refreshed: once the server rejects
    /// it, the session needs new credentials.
    Token(SecretString),
    /// Email account login.
    Account {
        email: String,
        password: SecretString,
        account_type: u8,
    },
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::from(token.into()))
    }

    pub fn account(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Account {
            email: email.into(),
            password: SecretString::from(password.into()),
            account_type: DEFAULT_ACCOUNT_TYPE,
        }
    }

    /// Whether a fresh token can be obtained by logging in.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Account { .. })
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Debug)]
pub(crate) struct Session {
    pub state: SessionState,
    pub token: Option<SecretString>,
    pub identity_id: Option<String>,
}

impl Session {
    pub fn from_credentials(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::Token(token) => Self {
                state: SessionState::Authenticated,
                token: Some(token.clone()),
                identity_id: None,
            },
            Credentials::Account { .. } => Self {
                state: SessionState::Unauthenticated,
                token: None,
                identity_id: None,
            },
        }
    }

    fn invalidate(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.token = None;
    }
}

impl FurbulousClient {
    /// Log in and store the new token.
    ///
    /// Every failure (bad credentials, a success envelope without a token,
    /// transport problems, non-2xx status) is reported as
    /// `Error::Authentication`.
    pub async fn authenticate(&self) -> Result<SecretString, Error> {
        let _gate = self.auth_gate.lock().await;
        self.login_locked().await
    }

    /// Current session state.
    pub async fn session_state(&self) -> SessionState {
        self.session.read().await.state
    }

    /// The bearer token currently held, if any.
    pub async fn token(&self) -> Option<SecretString> {
        self.session.read().await.token.clone()
    }

    /// The account's identity id from the last login.
    pub async fn identity_id(&self) -> Option<String> {
        self.session.read().await.identity_id.clone()
    }

    /// Whether a token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.state == SessionState::Authenticated
    }

    /// Full signed header set for `path`, logging in first if no token is
    /// held yet.
    pub async fn build_headers(&self, method: Method, path: &str) -> Result<HeaderMap, Error> {
        self.authorized_headers(&method, path)
            .await
            .map(|(headers, _)| headers)
    }

    /// Headers plus the token they carry, so a rejection can be matched
    /// against the token that caused it.
    pub(crate) async fn authorized_headers(
        &self,
        method: &Method,
        path: &str,
    ) -> Result<(HeaderMap, SecretString), Error> {
        let held = self.session.read().await.token.clone();
        let token = match held {
            Some(token) => token,
            None => self.authenticate_if_missing().await?,
        };
        let headers = SignedRequest::now(method.clone(), path).headers(Some(&token))?;
        Ok((headers, token))
    }

    /// Replace a token the server rejected.
    ///
    /// When another task already refreshed past `stale`, its token is
    /// reused and no login happens.
    pub(crate) async fn reauthenticate(&self, stale: &SecretString) -> Result<SecretString, Error> {
        let _gate = self.auth_gate.lock().await;
        {
            let session = self.session.read().await;
            if let Some(current) = &session.token {
                if current.expose_secret() != stale.expose_secret() {
                    debug!("token already refreshed by another request");
                    return Ok(current.clone());
                }
            }
        }
        self.session.write().await.invalidate();
        self.login_locked().await
    }

    async fn authenticate_if_missing(&self) -> Result<SecretString, Error> {
        let _gate = self.auth_gate.lock().await;
        if let Some(token) = self.session.read().await.token.clone() {
            return Ok(token);
        }
        self.login_locked().await
    }

    /// Login body. Caller must hold `auth_gate`.
    async fn login_locked(&self) -> Result<SecretString, Error> {
        let Credentials::Account {
            email,
            password,
            account_type,
        } = &self.credentials
        else {
            warn!("no account credentials to log in with");
            return Err(Error::Authentication {
                message: "no account credentials; a new token is required".into(),
            });
        };

        self.session.write().await.state = SessionState::Authenticating;
        let result = self.login(email, password, *account_type).await;

        let mut session = self.session.write().await;
        match result {
            Ok((token, identity_id)) => {
                session.state = SessionState::Authenticated;
                session.token = Some(token.clone());
                session.identity_id = identity_id;
                info!("login successful");
                Ok(token)
            }
            Err(e) => {
                session.invalidate();
                Err(e)
            }
        }
    }

    async fn login(
        &self,
        email: &str,
        password: &SecretString,
        account_type: u8,
    ) -> Result<(SecretString, Option<String>), Error> {
        let url = self.api_url(LOGIN_PATH, &[])?;
        debug!("logging in at {}", url);

        let headers = SignedRequest::now(Method::POST, LOGIN_PATH).headers(None)?;
        let body = LoginRequest::new(email, password.expose_secret(), account_type);

        let resp = self
            .http()
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login request failed: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let envelope: Envelope = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("unreadable login response: {e}"),
        })?;

        if !envelope.is_success() {
            return Err(Error::Authentication {
                message: envelope.message.unwrap_or_else(|| match envelope.code {
                    Some(code) => format!("login rejected (code {code})"),
                    None => "login rejected".into(),
                }),
            });
        }

        let data: LoginData = serde_json::from_value(envelope.data).unwrap_or_default();
        let token = data
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: "no token in login response".into(),
            })?;

        Ok((SecretString::from(token), data.identity_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_credentials_start_authenticated() {
        let session = Session::from_credentials(&Credentials::token("abc"));
        assert_eq!(session.state, SessionState::Authenticated);
        assert_eq!(session.token.as_ref().unwrap().expose_secret(), "abc");
    }

    #[test]
    fn account_credentials_start_unauthenticated() {
        let creds = Credentials::account("me@example.com", "pw");
        assert!(creds.can_login());
        let session = Session::from_credentials(&creds);
        assert_eq!(session.state, SessionState::Unauthenticated);
        assert!(session.token.is_none());
        assert!(!Credentials::token("t").can_login());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::account("me@example.com", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("me@example.com"));
    }
}
