//! Signature verification for signed session tokens.
//!
//! The scheme is `sha256WithRSAEncryption`: RSASSA-PKCS#1 v1.5 with SHA-256
//! over the UTF-8 message bytes, signature carried as standard base64. The
//! settings endpoint serves the key as bare base64 SubjectPublicKeyInfo, so
//! it is wrapped into PEM before parsing.
//!
//! An invalid signature is a normal negative result. Malformed key material
//! or signature encoding is a `Crypto` error: both point at system
//! misconfiguration rather than tampered input.

use crate::errors::AuthError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey as _;
use rsa::RsaPublicKey;
use sha2::Sha256;
use signature::Verifier as _;

/// PEM line width mandated by RFC 7468.
const PEM_LINE_WIDTH: usize = 64;

/// Checks that a signature authenticates a message under a public key.
///
/// Deterministic: the same `(message, signature, key)` triple always yields
/// the same result. Production wires [`RsaSha256Verifier`]; tests may wire
/// fakes.
pub trait SignatureVerifier: Send + Sync {
    /// Verify `signature_b64` (base64) against `message` (UTF-8 bytes)
    /// under `public_key_pem`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Crypto` for malformed key material or signature
    /// encoding. A signature that merely fails to verify is `Ok(false)`.
    fn verify(
        &self,
        message: &str,
        signature_b64: &str,
        public_key_pem: &str,
    ) -> Result<bool, AuthError>;
}

/// Wrap bare base64 key material in a PEM `PUBLIC KEY` envelope.
///
/// Key material that already looks PEM-wrapped is passed through.
pub fn base64_to_pem(raw_key: &str) -> String {
    let trimmed = raw_key.trim();
    if trimmed.starts_with("-----BEGIN") {
        return trimmed.to_string();
    }

    let compact: Vec<char> = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let mut pem = String::from("-----BEGIN PUBLIC KEY-----\n");
    for line in compact.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str("-----END PUBLIC KEY-----\n");
    pem
}

/// RSASSA-PKCS#1 v1.5 + SHA-256 verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct RsaSha256Verifier;

impl SignatureVerifier for RsaSha256Verifier {
    fn verify(
        &self,
        message: &str,
        signature_b64: &str,
        public_key_pem: &str,
    ) -> Result<bool, AuthError> {
        let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
            .map_err(|e| AuthError::Crypto(format!("Invalid public key: {e}")))?;

        let signature_bytes = STANDARD
            .decode(signature_b64)
            .map_err(|e| AuthError::Crypto(format!("Invalid signature encoding: {e}")))?;

        let signature = Signature::try_from(signature_bytes.as_slice())
            .map_err(|e| AuthError::Crypto(format!("Invalid signature bytes: {e}")))?;

        let verifying_key = VerifyingKey::<Sha256>::new(public_key);

        Ok(verifying_key.verify(message.as_bytes(), &signature).is_ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::EncodePublicKey as _;
    use rsa::RsaPrivateKey;
    use signature::{SignatureEncoding as _, Signer as _};
    use std::sync::OnceLock;

    static TEST_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

    fn test_key() -> &'static RsaPrivateKey {
        TEST_KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("keygen should succeed")
        })
    }

    fn test_key_pem() -> String {
        test_key()
            .to_public_key()
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .expect("pem encoding should succeed")
    }

    fn sign(message: &str) -> String {
        let signing_key = SigningKey::<Sha256>::new(test_key().clone());
        STANDARD.encode(signing_key.sign(message.as_bytes()).to_vec())
    }

    #[test]
    fn test_valid_signature_verifies() {
        let message = "expires=123&email=a@guardian.co.uk";
        let signature = sign(message);

        let verified = RsaSha256Verifier
            .verify(message, &signature, &test_key_pem())
            .expect("verification should not error");
        assert!(verified);
    }

    #[test]
    fn test_tampered_message_fails_without_error() {
        let signature = sign("original message");

        let verified = RsaSha256Verifier
            .verify("tampered message", &signature, &test_key_pem())
            .expect("a bad signature is not an error");
        assert!(!verified);
    }

    #[test]
    fn test_verification_is_deterministic() {
        let message = "expires=123";
        let signature = sign(message);
        let pem = test_key_pem();

        let first = RsaSha256Verifier.verify(message, &signature, &pem).unwrap();
        let second = RsaSha256Verifier.verify(message, &signature, &pem).unwrap();
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn test_malformed_key_is_crypto_error() {
        let result = RsaSha256Verifier.verify("msg", &sign("msg"), "not a pem");
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }

    #[test]
    fn test_malformed_signature_base64_is_crypto_error() {
        let result = RsaSha256Verifier.verify("msg", "!!!not-base64!!!", &test_key_pem());
        assert!(matches!(result, Err(AuthError::Crypto(_))));
    }

    #[test]
    fn test_base64_to_pem_wraps_at_64_columns() {
        let raw = "A".repeat(100);
        let pem = base64_to_pem(&raw);

        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines.first(), Some(&"-----BEGIN PUBLIC KEY-----"));
        assert_eq!(lines.get(1).map(|l| l.len()), Some(64));
        assert_eq!(lines.get(2).map(|l| l.len()), Some(36));
        assert_eq!(lines.last(), Some(&"-----END PUBLIC KEY-----"));
    }

    #[test]
    fn test_base64_to_pem_passthrough_for_pem_input() {
        let pem = test_key_pem();
        assert_eq!(base64_to_pem(&pem), pem.trim());
    }

    #[test]
    fn test_base64_to_pem_roundtrip_parses() {
        // Wrapping the bare settings-file key must produce a PEM the RSA
        // parser accepts.
        let der = test_key()
            .to_public_key()
            .to_public_key_der()
            .expect("der encoding should succeed");
        let raw = STANDARD.encode(der.as_bytes());

        let pem = base64_to_pem(&raw);
        assert!(RsaPublicKey::from_public_key_pem(&pem).is_ok());
    }
}
