//! Public key retrieval from the pan-domain settings endpoint.
//!
//! The settings endpoint serves one plain-text file per stage whose body is
//! `publicKey=<base64 key material>`. Failures come back as an XML-ish body
//! carrying a `<message>` element.
//!
//! Keys are optionally cached with a bounded staleness window so concurrent
//! authorizations do not hammer the endpoint; the cache never blocks
//! concurrent reads.

use crate::config::Config;
use crate::errors::AuthError;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Source of the current public verification key material.
///
/// Implementations return the raw (non-PEM) key value. Production wires the
/// HTTP settings endpoint; tests wire fakes.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the current public key material.
    async fn public_key(&self) -> Result<String, AuthError>;
}

/// A fetched key plus the instant it goes stale.
struct CachedKey {
    key: String,
    expires_at: Instant,
}

/// `KeySource` backed by the stage's HTTP settings file.
pub struct HttpKeySource {
    /// Full URL of the settings file for the configured stage.
    url: String,

    /// HTTP client with request and connect timeouts applied.
    http_client: reqwest::Client,

    /// Cached key material; `None` until the first successful fetch.
    cache: RwLock<Option<CachedKey>>,

    /// Staleness window for the cache. Zero disables caching.
    cache_ttl: Duration,
}

impl HttpKeySource {
    /// Build a key source from the authorizer configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeySource` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .connect_timeout(config.http_timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| AuthError::KeySource(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: config.public_key_url(),
            http_client,
            cache: RwLock::new(None),
            cache_ttl: config.key_cache_ttl,
        })
    }

    /// Fetch the settings file and extract the key value.
    ///
    /// No retry here: retries, if desired, belong to the caller.
    #[instrument(skip_all)]
    async fn fetch(&self) -> Result<String, AuthError> {
        tracing::debug!(target: "authorizer.key_source", url = %self.url, "Fetching public key");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::KeySource(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::KeySource(format!("Failed to read response body: {e}")))?;

        if status.as_u16() == 200 {
            Ok(strip_public_key_prefix(&body).to_string())
        } else {
            let message = extract_xml_message(&body)
                .unwrap_or("Invalid public key response")
                .to_string();
            tracing::warn!(
                target: "authorizer.key_source",
                status = status.as_u16(),
                message = %message,
                "Settings endpoint returned an error"
            );
            Err(AuthError::KeySource(message))
        }
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    #[instrument(skip_all)]
    async fn public_key(&self) -> Result<String, AuthError> {
        if !self.cache_ttl.is_zero() {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    tracing::debug!(target: "authorizer.key_source", "Public key cache hit");
                    return Ok(cached.key.clone());
                }
            }
        }

        let key = self.fetch().await?;

        if !self.cache_ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKey {
                key: key.clone(),
                expires_at: Instant::now() + self.cache_ttl,
            });
        }

        Ok(key)
    }
}

/// Strip a leading `publicKey=` (case-insensitive) from the response body.
///
/// A body without the prefix is passed through untouched, matching the
/// original endpoint contract.
fn strip_public_key_prefix(body: &str) -> &str {
    const PREFIX: &str = "publicKey=";
    match body.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => {
            body.get(PREFIX.len()..).unwrap_or("")
        }
        _ => body,
    }
}

/// Extract the text of the first `<message>...</message>` element,
/// case-insensitively, from an XML-ish error body.
fn extract_xml_message(body: &str) -> Option<&str> {
    let lower = body.to_ascii_lowercase();
    let open = lower.find("<message>")?;
    let start = open + "<message>".len();
    let close = lower.get(start..)?.find("</message>")? + start;
    body.get(start..close)
}
