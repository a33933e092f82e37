//! Configuration for Furbulous clients.
//!
//! TOML file, credential resolution (env + plaintext), and translation to
//! `furbulous_core::ClientConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use furbulous_core::{
    ClientConfig, Credentials, DEFAULT_ACCOUNT_TYPE, DEFAULT_BASE_URL, DEFAULT_FAST_INTERVAL,
    DEFAULT_GENERAL_INTERVAL, TlsMode, TransportConfig,
};

/// Prefix for every environment override.
pub const ENV_PREFIX: &str = "FURBULOUS_";
/// Default token variable when `token_env` is unset.
pub const TOKEN_ENV: &str = "FURBULOUS_TOKEN";
/// Default password variable when `password_env` is unset.
pub const PASSWORD_ENV: &str = "FURBULOUS_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured: set a token or an email and password")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// On-disk configuration for one Furbulous account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// API host.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login account type (1 = email).
    #[serde(default = "default_account_type")]
    pub account_type: u8,

    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password in plaintext; prefer an environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Pre-obtained token in plaintext; prefer an environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to an extra CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// General poll period in seconds. 0 disables it.
    #[serde(default = "default_general_interval")]
    pub general_interval_secs: u64,

    /// Fast poll period in seconds. 0 disables it.
    #[serde(default = "default_fast_interval")]
    pub fast_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            account_type: default_account_type(),
            email: None,
            password: None,
            password_env: None,
            token: None,
            token_env: None,
            ca_cert: None,
            general_interval_secs: default_general_interval(),
            fast_interval_secs: default_fast_interval(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_account_type() -> u8 {
    DEFAULT_ACCOUNT_TYPE
}
fn default_general_interval() -> u64 {
    DEFAULT_GENERAL_INTERVAL.as_secs()
}
fn default_fast_interval() -> u64 {
    DEFAULT_FAST_INTERVAL.as_secs()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "furbulous", "furbulous").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("furbulous");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file yields the
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve credentials from the process environment and the config.
pub fn resolve_credentials(cfg: &Config) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(cfg, |name| std::env::var(name).ok())
}

/// Resolve credentials with an explicit environment lookup.
///
/// A token wins over account credentials:
/// 1. token: `token_env` → `FURBULOUS_TOKEN` → plaintext `token`
/// 2. account: `email` + password from `password_env` →
///    `FURBULOUS_PASSWORD` → plaintext `password`
pub fn resolve_credentials_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let lookup = |named: Option<&String>, fallback: &str, plaintext: Option<&String>| {
        named
            .and_then(|name| env(name))
            .or_else(|| env(fallback))
            .or_else(|| plaintext.cloned())
            .filter(|v| !v.is_empty())
    };

    if let Some(token) = lookup(cfg.token_env.as_ref(), TOKEN_ENV, cfg.token.as_ref()) {
        return Ok(Credentials::Token(SecretString::from(token)));
    }

    let Some(email) = cfg.email.clone().filter(|e| !e.is_empty()) else {
        return Err(ConfigError::NoCredentials);
    };
    let password = lookup(cfg.password_env.as_ref(), PASSWORD_ENV, cfg.password.as_ref())
        .ok_or(ConfigError::NoCredentials)?;

    Ok(Credentials::Account {
        email,
        password: SecretString::from(password),
        account_type: cfg.account_type,
    })
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Build a `ClientConfig`, resolving credentials from the environment.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        self.to_client_config_with(resolve_credentials(self)?)
    }

    /// Build a `ClientConfig` with already-resolved credentials.
    pub fn to_client_config_with(
        &self,
        credentials: Credentials,
    ) -> Result<ClientConfig, ConfigError> {
        let base_url: url::Url = self
            .base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL: {}", self.base_url),
            })?;

        let mut transport = TransportConfig::default();
        if let Some(ref ca_path) = self.ca_cert {
            transport.tls = TlsMode::CustomCa(ca_path.clone());
        }

        let mut client = ClientConfig::with_base_url(base_url, credentials);
        client.transport = transport;
        client.general_interval = Duration::from_secs(self.general_interval_secs);
        client.fast_interval = Duration::from_secs(self.fast_interval_secs);
        Ok(client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.base_url, "https://app.api.us.furbulouspet.com:1443");
        assert_eq!(cfg.account_type, 1);
        assert_eq!(cfg.general_interval_secs, 300);
        assert_eq!(cfg.fast_interval_secs, 20);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            email: Some("me@example.com".into()),
            password_env: Some("MY_PW".into()),
            fast_interval_secs: 30,
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("email = \"me@example.com\""));
        assert!(!text.contains("token"));

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "token = \"file-token\"\ngeneral_interval_secs = 600\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.token.as_deref(), Some("file-token"));
        assert_eq!(cfg.general_interval_secs, 600);
        assert_eq!(cfg.fast_interval_secs, 20);
    }

    #[test]
    fn token_resolution_order() {
        let cfg = Config {
            token: Some("plain".into()),
            token_env: Some("CUSTOM_TOKEN".into()),
            ..Config::default()
        };

        let creds = resolve_credentials_with(&cfg, env_of(&[("CUSTOM_TOKEN", "custom")])).unwrap();
        assert!(matches!(&creds, Credentials::Token(t) if t.expose_secret() == "custom"));

        let creds = resolve_credentials_with(&cfg, env_of(&[(TOKEN_ENV, "default")])).unwrap();
        assert!(matches!(&creds, Credentials::Token(t) if t.expose_secret() == "default"));

        let creds = resolve_credentials_with(&cfg, no_env).unwrap();
        assert!(matches!(&creds, Credentials::Token(t) if t.expose_secret() == "plain"));
    }

    #[test]
    fn token_wins_over_account() {
        let cfg = Config {
            email: Some("me@example.com".into()),
            password: Some("pw".into()),
            token: Some("tok".into()),
            ..Config::default()
        };
        let creds = resolve_credentials_with(&cfg, no_env).unwrap();
        assert!(matches!(creds, Credentials::Token(_)));
    }

    #[test]
    fn account_credentials_from_env_password() {
        let cfg = Config {
            email: Some("me@example.com".into()),
            password: Some("plain".into()),
            account_type: 2,
            ..Config::default()
        };
        let creds = resolve_credentials_with(&cfg, env_of(&[(PASSWORD_ENV, "from-env")])).unwrap();
        match creds {
            Credentials::Account {
                email,
                password,
                account_type,
            } => {
                assert_eq!(email, "me@example.com");
                assert_eq!(password.expose_secret(), "from-env");
                assert_eq!(account_type, 2);
            }
            Credentials::Token(_) => panic!("expected account credentials"),
        }
    }

    #[test]
    fn no_credentials_is_an_error() {
        let cfg = Config {
            email: Some("me@example.com".into()),
            ..Config::default()
        };
        assert!(matches!(
            resolve_credentials_with(&cfg, no_env),
            Err(ConfigError::NoCredentials)
        ));
        assert!(matches!(
            resolve_credentials_with(&Config::default(), no_env),
            Err(ConfigError::NoCredentials)
        ));
    }

    #[test]
    fn client_config_translation() {
        let cfg = Config {
            general_interval_secs: 0,
            fast_interval_secs: 15,
            ca_cert: Some("/etc/ssl/proxy.pem".into()),
            ..Config::default()
        };
        let client = cfg.to_client_config_with(Credentials::token("t")).unwrap();
        assert_eq!(client.general_interval, Duration::ZERO);
        assert_eq!(client.fast_interval, Duration::from_secs(15));
        assert_eq!(client.base_url.port(), Some(1443));
        assert!(matches!(client.transport.tls, TlsMode::CustomCa(_)));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let cfg = Config {
            base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_client_config_with(Credentials::token("t")),
            Err(ConfigError::Validation { field, .. }) if field == "base_url"
        ));
    }
}
