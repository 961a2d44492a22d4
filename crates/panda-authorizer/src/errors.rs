//! Authorizer error types.
//!
//! Every variant is recoverable at the decision boundary: the pipeline
//! catches all of them, logs the message, and emits a Deny with an empty
//! principal. Nothing here is ever surfaced to the calling gateway, so the
//! caller cannot distinguish which check failed.

use thiserror::Error;

/// Authorization pipeline error.
///
/// The `Display` strings are the messages that reach the log, and they keep
/// the wording of the original pan-domain policy where one existed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The invocation carried no authorization token at all.
    #[error("Missing authorization token")]
    MissingCredential,

    /// The token could not be split/base64-decoded into a signed envelope.
    #[error("Invalid token encoding: {0}")]
    Decode(String),

    /// The public key settings endpoint failed or returned garbage.
    #[error("Public key unavailable: {0}")]
    KeySource(String),

    /// Malformed key material, signature encoding, or verifier failure.
    ///
    /// This indicates system misconfiguration, not tampered input: a merely
    /// invalid signature is `InvalidSignature`, never `Crypto`.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// The signature does not authenticate the message under the key.
    #[error("Invalid authorization token signature")]
    InvalidSignature,

    /// The `expires` claim is missing, unparsable, or in the past.
    ///
    /// Unparsable and expired deliberately report the same error: both mean
    /// current validity cannot be certified.
    #[error("User authorisation has expired")]
    Expired,

    /// The `email` claim does not contain the organization domain.
    #[error("User is not a valid organisation user")]
    DomainMismatch,

    /// The `multifactor` claim is not the literal string "true".
    #[error("User doesn't have 2FA turned on")]
    MfaRequired,
}

impl AuthError {
    /// Whether this failure points at our own configuration or
    /// infrastructure rather than at the untrusted input.
    ///
    /// Used only to pick the log level; the emitted decision is an
    /// identical Deny either way.
    pub fn is_system(&self) -> bool {
        matches!(self, AuthError::KeySource(_) | AuthError::Crypto(_))
    }
}
