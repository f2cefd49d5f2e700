//! Recovery of session tokens from cookies whose transport signature failed.
//!
//! After a cookie secret rotation (or drift between instances) a signed cookie no
//! longer verifies and lands in the unsigned bag as `s:<header>.<payload>.<sig>.<cookie sig>`.
//! The embedded token is extracted here; it is trusted only once the token codec
//! verifies it.

/// Marker prefixed to transport-signed cookie values.
pub const SIGNED_COOKIE_PREFIX: &str = "s:";

const TOKEN_SEGMENTS: usize = 3;

/// Extract a candidate token from a raw cookie value.
///
/// Values without the signed marker are returned unchanged. Marked values are
/// stripped and truncated to their first three dot-separated segments; values with
/// fewer segments are returned stripped and fail verification downstream.
#[must_use]
pub fn recover(raw: &str) -> String {
    let Some(stripped) = raw.strip_prefix(SIGNED_COOKIE_PREFIX) else {
        return raw.to_string();
    };

    let segments: Vec<&str> = stripped.split('.').collect();
    if segments.len() < TOKEN_SEGMENTS {
        return stripped.to_string();
    }

    segments[..TOKEN_SEGMENTS].join(".")
}

/// Whether the value has the three-segment shape of a token.
#[must_use]
pub fn is_token_shaped(value: &str) -> bool {
    value.split('.').count() == TOKEN_SEGMENTS
}
