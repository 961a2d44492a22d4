//! User claims decoded from a verified token message.
//!
//! The message is a flat query-string-encoded mapping
//! (`key=value&key2=value2`, URL-escaped). There is no schema enforcement
//! at decode time: absent fields are absent keys, not errors.

use crate::errors::AuthError;
use std::collections::HashMap;
use std::fmt;

/// Flat string-to-string claims asserted by the session token.
///
/// Values are identity material and are redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Claims(HashMap<String, String>);

impl Claims {
    /// Look up a claim by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `expires` timestamp claim, if present.
    pub fn expires(&self) -> Option<&str> {
        self.get("expires")
    }

    /// The `email` claim, absent rendered as empty.
    pub fn email(&self) -> &str {
        self.get("email").unwrap_or("")
    }

    /// The `multifactor` flag claim, if present.
    pub fn multifactor(&self) -> Option<&str> {
        self.get("multifactor")
    }

    /// Display first name, absent rendered as empty.
    pub fn first_name(&self) -> &str {
        self.get("firstName").unwrap_or("")
    }

    /// Display last name, absent rendered as empty.
    pub fn last_name(&self) -> &str {
        self.get("lastName").unwrap_or("")
    }

    #[cfg(test)]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Claims").field("keys", &keys).finish()
    }
}

/// Decode a verified message into claims.
///
/// Standard query-string semantics: pairs split on `&`, `+` means space,
/// percent-escapes are decoded, duplicate keys last-wins. A pair without
/// `=` becomes a key with an empty value.
///
/// # Errors
///
/// Returns `AuthError::Decode` if a percent-escape decodes to invalid UTF-8.
pub fn decode_claims(message: &str) -> Result<Claims, AuthError> {
    let mut map = HashMap::new();

    for pair in message.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        map.insert(unescape(key)?, unescape(value)?);
    }

    Ok(Claims(map))
}

fn unescape(component: &str) -> Result<String, AuthError> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|cow| cow.into_owned())
        .map_err(|e| AuthError::Decode(format!("Invalid escape in claims: {e}")))
}
