//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTFOLIO_API_URL` - Backend base origin (e.g., `https://api.example.com`)
//!
//! ## Optional
//! - `PORTFOLIO_API_TOKEN` - Bearer token sent with every request
//! - `PORTFOLIO_TOKEN_FILE` - Path to a persisted token, re-read on every request
//! - `PORTFOLIO_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! `PORTFOLIO_API_TOKEN` and `PORTFOLIO_TOKEN_FILE` are mutually exclusive.
//! With neither set, requests go out without an `Authorization` header.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::credential::CredentialSource;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Placeholder fragments that indicate a token was never filled in.
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "xxx"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend base origin; all API paths are relative to it.
    pub api_url: Url,
    /// Bearer token source.
    pub credential: CredentialSource,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("PORTFOLIO_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("PORTFOLIO_API_URL".to_string()))?;
        let api_url = parse_api_url(&raw_url)?;

        let credential = match (
            lookup("PORTFOLIO_API_TOKEN").filter(|v| !v.trim().is_empty()),
            lookup("PORTFOLIO_TOKEN_FILE").filter(|v| !v.trim().is_empty()),
        ) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidEnvVar(
                    "PORTFOLIO_API_TOKEN".to_string(),
                    "PORTFOLIO_API_TOKEN and PORTFOLIO_TOKEN_FILE cannot both be set".to_string(),
                ));
            }
            (Some(token), None) => {
                let token = SecretString::from(token.trim().to_string());
                warn_if_placeholder(&token);
                CredentialSource::Static(token)
            }
            (None, Some(path)) => CredentialSource::File(PathBuf::from(path)),
            (None, None) => CredentialSource::None,
        };

        let timeout_secs = match lookup("PORTFOLIO_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("PORTFOLIO_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PORTFOLIO_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            credential,
            timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: lookup("SENTRY_DSN"),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

/// Parse and validate the backend base origin.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("PORTFOLIO_API_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "PORTFOLIO_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidEnvVar(
            "PORTFOLIO_API_URL".to_string(),
            "must not contain a query or fragment".to_string(),
        ));
    }

    Ok(url)
}

/// Log a warning when a token looks like an unfilled template value.
fn warn_if_placeholder(token: &SecretString) {
    let lower = token.expose_secret().to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        tracing::warn!("PORTFOLIO_API_TOKEN appears to be a placeholder (contains '{pattern}')");
    }
}
