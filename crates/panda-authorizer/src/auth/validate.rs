//! Claims validation policy.
//!
//! Checks run in a fixed order and short-circuit on the first failure so
//! error reporting stays deterministic: expiry, then organization domain,
//! then multi-factor flag. Validation never transforms the claims.

use crate::auth::claims::Claims;
use crate::errors::AuthError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Validate claims against policy at time `now`.
///
/// # Errors
///
/// - `Expired` - `expires` missing, unparsable, or earlier than `now`.
///   Unparsable and actually-expired report identically: neither can
///   certify current validity.
/// - `DomainMismatch` - `email` does not contain `organization_domain`.
/// - `MfaRequired` - `multifactor` is not the literal string `"true"`.
pub fn validate(
    claims: &Claims,
    organization_domain: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let Some(expires) = claims.expires().and_then(parse_expiry) else {
        return Err(AuthError::Expired);
    };
    if expires < now {
        return Err(AuthError::Expired);
    }

    // Substring containment, not a suffix check, reproducing the upstream
    // policy verbatim. `user@guardian.co.uk.evil.com` passes; tightening
    // this needs product sign-off (tracked as an open question).
    if !claims.email().contains(organization_domain) {
        return Err(AuthError::DomainMismatch);
    }

    if claims.multifactor() != Some("true") {
        return Err(AuthError::MfaRequired);
    }

    Ok(())
}

/// Parse an `expires` claim into a UTC timestamp.
///
/// Accepts the formats seen in real sessions: epoch milliseconds, RFC 3339,
/// RFC 2822, and the JavaScript `Date#toString` shape
/// `"Thu May 26 2016 18:00:00 GMT"` (with or without a numeric offset).
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let millis = trimmed.parse::<i64>().ok()?;
        return Utc.timestamp_millis_opt(millis).single();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    parse_js_date(trimmed)
}

/// Parse the JavaScript `Date#toString` shape.
///
/// Examples: `"Thu May 26 2016 18:00:00 GMT"`,
/// `"Thu May 26 2016 18:00:00 GMT+0100 (British Summer Time)"`.
fn parse_js_date(raw: &str) -> Option<DateTime<Utc>> {
    let (datetime_part, zone_part) = raw.split_once(" GMT")?;

    let naive = NaiveDateTime::parse_from_str(datetime_part, "%a %b %d %Y %H:%M:%S").ok()?;

    let offset_minutes = parse_offset(zone_part).unwrap_or(0);
    let utc = naive - chrono::Duration::minutes(offset_minutes);
    Some(Utc.from_utc_datetime(&utc))
}

/// Parse a `+HHMM`/`-HHMM` offset suffix into minutes, ignoring any
/// trailing zone name. Absent offset means UTC.
fn parse_offset(zone_part: &str) -> Option<i64> {
    let mut chars = zone_part.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };

    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours = digits.get(..2)?.parse::<i64>().ok()?;
    let minutes = digits.get(2..)?.parse::<i64>().ok()?;
    Some(sign * (hours * 60 + minutes))
}
