//! Authorizer configuration.
//!
//! Configuration is computed once from environment variables at process
//! start and passed into the pipeline constructor as an immutable value.
//! Nothing in here is ambient state.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default settings endpoint hosting the public key files.
pub const DEFAULT_SETTINGS_ENDPOINT: &str =
    "https://s3-eu-west-1.amazonaws.com/pan-domain-auth-settings";

/// Default organization domain required in the `email` claim.
pub const DEFAULT_ORGANIZATION_DOMAIN: &str = "guardian.co.uk";

/// Default HTTP timeout for the key fetch.
///
/// The original imposed no timeout at all; an explicit bound is a documented
/// deviation so a slow settings endpoint cannot stall the calling request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Default staleness window for the cached public key.
pub const DEFAULT_KEY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Deployment stage, selecting which settings file carries the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prod,
    Code,
    Local,
}

impl Stage {
    /// Derive the stage from a function-name string such as
    /// `some-authorizer-PROD`.
    ///
    /// The name is split on `-` and the last token containing `COD` or `PRO`
    /// wins (the original matched `/(CODE?|PROD?)/`, so partial variants
    /// select a token but only exact `PROD`/`CODE` map to a real stage).
    /// Anything else falls back to the local stage.
    pub fn from_function_name(name: &str) -> Self {
        let candidate = name
            .split('-')
            .filter(|token| token.contains("COD") || token.contains("PRO"))
            .next_back();

        match candidate {
            Some("PROD") => Stage::Prod,
            Some("CODE") => Stage::Code,
            _ => Stage::Local,
        }
    }

    /// Name of the settings file that carries this stage's public key.
    pub fn settings_file(self) -> &'static str {
        match self {
            Stage::Prod => "gutools.co.uk.settings.public",
            Stage::Code => "code.dev-gutools.co.uk.settings.public",
            Stage::Local => "local.dev-gutools.co.uk.settings.public",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Authorizer configuration.
///
/// Loaded from environment variables with sensible defaults; every field is
/// overridable so tests can point the key fetch at a mock endpoint.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment stage, derived from `AWS_LAMBDA_FUNCTION_NAME`.
    pub stage: Stage,

    /// Base URL of the settings endpoint (no trailing slash).
    pub settings_endpoint: String,

    /// Domain substring the `email` claim must contain.
    pub organization_domain: String,

    /// Request timeout for the key fetch.
    pub http_timeout: Duration,

    /// How long a fetched public key may be served from cache.
    /// Zero disables caching.
    pub key_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let stage = Stage::from_function_name(
            vars.get("AWS_LAMBDA_FUNCTION_NAME")
                .map(String::as_str)
                .unwrap_or(""),
        );

        let settings_endpoint = vars
            .get("AUTH_SETTINGS_ENDPOINT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SETTINGS_ENDPOINT.to_string());

        let organization_domain = vars
            .get("AUTH_ORGANIZATION_DOMAIN")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ORGANIZATION_DOMAIN.to_string());

        let http_timeout = parse_seconds(vars, "AUTH_HTTP_TIMEOUT_SECONDS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let key_cache_ttl = parse_seconds(vars, "AUTH_KEY_CACHE_TTL_SECONDS")?
            .unwrap_or(DEFAULT_KEY_CACHE_TTL);

        Ok(Config {
            stage,
            settings_endpoint,
            organization_domain,
            http_timeout,
            key_cache_ttl,
        })
    }

    /// Full URL of the stage's public key settings file.
    pub fn public_key_url(&self) -> String {
        format!(
            "{}/{}",
            self.settings_endpoint.trim_end_matches('/'),
            self.stage.settings_file()
        )
    }
}

fn parse_seconds(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<Option<Duration>, ConfigError> {
    match vars.get(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw.clone(),
            }),
    }
}
