//! Authorization decision pipeline.
//!
//! A single linear pipeline per invocation: decode token, fetch key, verify
//! signature, decode claims, validate claims, build the Allow policy. Any
//! failure at any stage is logged and converges to a Deny with an empty
//! principal; nothing propagates past the decision boundary. The pipeline
//! is stateless and reentrant across concurrent invocations.

use crate::auth::claims::{self, Claims};
use crate::auth::cookie::{self, SignedEnvelope};
use crate::auth::crypto::{base64_to_pem, RsaSha256Verifier, SignatureVerifier};
use crate::auth::validate;
use crate::config::Config;
use crate::errors::AuthError;
use crate::key_source::{HttpKeySource, KeySource};
use crate::policy::{AuthorizerRequest, AuthorizerResponse};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::instrument;

/// Source of the current time, injectable so tests control validity.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock reading the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The request authorizer.
///
/// Holds only immutable policy configuration and shared read-only
/// collaborators, so a single instance serves concurrent invocations.
pub struct Authorizer {
    organization_domain: String,
    key_source: Arc<dyn KeySource>,
    verifier: Arc<dyn SignatureVerifier>,
    clock: Arc<dyn Clock>,
}

impl Authorizer {
    /// Build an authorizer with production collaborators: HTTP key source,
    /// RSA-SHA256 verifier, system clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeySource` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        Ok(Self::with_collaborators(
            config,
            Arc::new(HttpKeySource::new(config)?),
            Arc::new(RsaSha256Verifier),
            Arc::new(SystemClock),
        ))
    }

    /// Build an authorizer with explicit collaborators (tests wire fakes).
    pub fn with_collaborators(
        config: &Config,
        key_source: Arc<dyn KeySource>,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            organization_domain: config.organization_domain.clone(),
            key_source,
            verifier,
            clock,
        }
    }

    /// Decide whether the request is allowed, and on whose behalf.
    ///
    /// Never fails: every pipeline error is logged and emitted as a Deny
    /// with an empty principal, so the caller cannot tell which check
    /// rejected the request. The `methodArn` passes through unchanged as
    /// the decision's resource.
    #[instrument(skip_all)]
    pub async fn authorize(&self, request: &AuthorizerRequest) -> AuthorizerResponse {
        match self.check(&request.authorization_token).await {
            Ok(claims) => {
                let principal = principal(&claims);
                tracing::info!(target: "authorizer", "Request authorized");
                AuthorizerResponse::allow(principal, &request.method_arn)
            }
            Err(error) => {
                if error.is_system() {
                    tracing::error!(target: "authorizer", error = %error, "Authorization failed");
                } else {
                    tracing::warn!(target: "authorizer", error = %error, "Authorization denied");
                }
                AuthorizerResponse::deny(&request.method_arn)
            }
        }
    }

    /// Run the fallible pipeline up to validated claims.
    async fn check(&self, authorization_token: &str) -> Result<Claims, AuthError> {
        if authorization_token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let envelope = self.decode(authorization_token)?;

        let raw_key = self.key_source.public_key().await?;
        let pem = base64_to_pem(&raw_key);

        if !self
            .verifier
            .verify(&envelope.message, &envelope.signature, &pem)?
        {
            return Err(AuthError::InvalidSignature);
        }

        let claims = claims::decode_claims(&envelope.message)?;
        validate::validate(&claims, &self.organization_domain, self.clock.now())?;

        Ok(claims)
    }

    /// Extract the session cookie and split it into a signed envelope.
    ///
    /// A header without the session cookie decodes as an empty token, which
    /// goes on to fail signature verification rather than short-circuiting.
    fn decode(&self, authorization_token: &str) -> Result<SignedEnvelope, AuthError> {
        let token = cookie::session_cookie(authorization_token).unwrap_or("");
        cookie::decode_token(token)
    }
}

/// Format the Allow principal as `"<firstName> <lastName> <email>"`.
///
/// Absent names render as empty segments, so a claims set with only an
/// email yields `"  <email>"` exactly.
fn principal(claims: &Claims) -> String {
    format!(
        "{} {} <{}>",
        claims.first_name(),
        claims.last_name(),
        claims.email()
    )
}
