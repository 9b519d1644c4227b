#![forbid(unsafe_code)]

use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub const CRATE_NAME: &str = "civiclens-core";

/// Token assumed for requests that carry no `X-Session-ID` header.
///
/// Every such caller collapses to the same fingerprint, so anonymous votes
/// on one issue collide on the ledger key. Intentional: the header is the
/// only session signal the frontend sends.
pub const ANONYMOUS_SESSION_TOKEN: &str = "anonymous-session";

/// Default salt when `SESSION_SALT` is not configured.
pub const DEFAULT_SESSION_SALT: &str = "civiclens-session-salt";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Derives the ledger key for a client session token.
///
/// Deterministic and stable across process restarts as long as the salt
/// stays fixed; not reversible to the original token.
#[must_use]
pub fn session_fingerprint(token: &str, salt: &str) -> String {
    sha256_hex(format!("{salt}:{token}").as_bytes())
}

// Fixed-width, zero-padded, so lexicographic order equals chronological order.
const ISO_UTC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

#[must_use]
pub fn format_iso(instant: OffsetDateTime) -> String {
    instant
        .format(ISO_UTC)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Current instant as an ISO-8601 UTC string.
#[must_use]
pub fn now_iso() -> String {
    format_iso(OffsetDateTime::now_utc())
}

/// Parses timestamps produced by `format_iso` as well as RFC 3339 values
/// coming back from the row store.
#[must_use]
pub fn parse_iso(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339).ok()
}

#[must_use]
pub fn unix_millis(instant: OffsetDateTime) -> i128 {
    instant.unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic_and_salt_sensitive() {
        let a = session_fingerprint("session-1", DEFAULT_SESSION_SALT);
        let b = session_fingerprint("session-1", DEFAULT_SESSION_SALT);
        let c = session_fingerprint("session-1", "another-salt");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn anonymous_callers_share_one_fingerprint() {
        let first = session_fingerprint(ANONYMOUS_SESSION_TOKEN, DEFAULT_SESSION_SALT);
        let second = session_fingerprint(ANONYMOUS_SESSION_TOKEN, DEFAULT_SESSION_SALT);
        assert_eq!(first, second);
    }

    #[test]
    fn iso_format_is_fixed_width_and_parseable() {
        let formatted = now_iso();
        assert_eq!(formatted.len(), 20);
        assert!(formatted.ends_with('Z'));
        assert!(parse_iso(&formatted).is_some());
    }

    #[test]
    fn iso_order_matches_chronological_order() {
        let earlier = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("ts");
        let later = OffsetDateTime::from_unix_timestamp(1_700_000_001).expect("ts");
        assert!(format_iso(earlier) < format_iso(later));
    }
}
