//! Session cookie extraction and signed-envelope decoding.
//!
//! The gateway hands us the request's Cookie header as the authorization
//! token. The session cookie is named `gutoolsAuth-assym` and its value is
//! `<base64 message>.<signature>`: everything after the LAST dot is the
//! signature (itself base64, used verbatim), everything before it decodes to
//! the query-string-encoded claims message.

use crate::errors::AuthError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Name of the pan-domain asymmetric session cookie.
pub const SESSION_COOKIE: &str = "gutoolsAuth-assym";

/// A raw token split into its signed parts.
///
/// `message` is the decoded plaintext; `signature` stays in its native
/// base64 encoding for the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub message: String,
    pub signature: String,
}

/// Pull the session cookie value out of a Cookie-header-style string.
///
/// A header that does not carry the cookie yields an empty token, which then
/// fails signature verification downstream rather than short-circuiting —
/// only a wholly absent header is a missing credential.
pub fn session_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name.trim() == SESSION_COOKIE).then(|| value.trim())
    })
}

/// Split a raw token into message and signature at the last dot.
///
/// A token without a separator produces an empty message and the whole
/// token as the signature; such an envelope simply fails verification.
///
/// # Errors
///
/// Returns `AuthError::Decode` when the message half is not valid base64
/// or does not decode to UTF-8.
pub fn decode_token(raw: &str) -> Result<SignedEnvelope, AuthError> {
    let (encoded_message, signature) = match raw.rfind('.') {
        Some(dot) => (raw.get(..dot).unwrap_or(""), raw.get(dot + 1..).unwrap_or("")),
        None => ("", raw),
    };

    let message_bytes = STANDARD
        .decode(encoded_message)
        .map_err(|e| AuthError::Decode(format!("Invalid base64 message: {e}")))?;

    let message = String::from_utf8(message_bytes)
        .map_err(|e| AuthError::Decode(format!("Message is not UTF-8: {e}")))?;

    Ok(SignedEnvelope {
        message,
        signature: signature.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_single() {
        assert_eq!(
            session_cookie("gutoolsAuth-assym=abc.def"),
            Some("abc.def")
        );
    }

    #[test]
    fn test_session_cookie_among_others() {
        let header = "theme=dark; gutoolsAuth-assym=abc.def; other=1";
        assert_eq!(session_cookie(header), Some("abc.def"));
    }

    #[test]
    fn test_session_cookie_absent() {
        assert_eq!(session_cookie("theme=dark"), None);
        assert_eq!(session_cookie(""), None);
    }

    #[test]
    fn test_decode_token_splits_at_last_dot() {
        let message = "expires=123&email=a@b";
        let encoded = STANDARD.encode(message);
        let raw = format!("{encoded}.the-signature");

        let envelope = decode_token(&raw).expect("decode should succeed");
        assert_eq!(envelope.message, message);
        assert_eq!(envelope.signature, "the-signature");
    }

    #[test]
    fn test_decode_token_without_separator() {
        // No dot: the message is empty and the whole token is the signature.
        let envelope = decode_token("AAAA").expect("decode should succeed");
        assert_eq!(envelope.message, "");
        assert_eq!(envelope.signature, "AAAA");
    }

    #[test]
    fn test_decode_token_empty() {
        let envelope = decode_token("").expect("decode should succeed");
        assert_eq!(envelope.message, "");
        assert_eq!(envelope.signature, "");
    }

    #[test]
    fn test_decode_token_invalid_base64() {
        let result = decode_token("!!!not-base64!!!.signature");
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_decode_token_non_utf8_message() {
        // 0xFF 0xFE is not valid UTF-8
        let encoded = STANDARD.encode([0xFFu8, 0xFE]);
        let result = decode_token(&format!("{encoded}.sig"));
        assert!(matches!(result, Err(AuthError::Decode(_))));
    }

    #[test]
    fn test_decode_token_signature_kept_verbatim() {
        // The signature half is not base64-validated at this stage.
        let encoded = STANDARD.encode("msg");
        let envelope =
            decode_token(&format!("{encoded}.%%garbage%%")).expect("decode should succeed");
        assert_eq!(envelope.signature, "%%garbage%%");
    }
}
