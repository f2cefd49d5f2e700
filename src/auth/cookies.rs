//! Cookie transport: parsing, transport signatures and `Set-Cookie` values.
//!
//! Signed values use the `s:<value>.<mac>` layout, where `<mac>` is the base64
//! (unpadded) HMAC-SHA256 of `<value>` under the cookie secret. Values are
//! URL-encoded on the wire.
//!
//! Parsing splits cookies into two bags. A marked value whose signature verifies is
//! stored in the signed bag without marker and signature. Everything else,
//! including marked values that fail verification, stays in the unsigned bag as
//! received.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64Unpadded, Encoding};
use hmac::{digest::InvalidLength, Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

use super::{
    config::{SessionConfig, STAY_CONNECTED_MAX_AGE_SECONDS},
    recover::SIGNED_COOKIE_PREFIX,
};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("invalid cookie secret")]
    Key(#[from] InvalidLength),
    #[error("invalid cookie header value")]
    Header(#[from] InvalidHeaderValue),
}

fn mac(secret: &SecretString) -> Result<HmacSha256, InvalidLength> {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
}

/// Produce the transport-signed form `s:<value>.<mac>`.
///
/// # Errors
///
/// Returns an error if the secret is not a usable HMAC key.
pub fn sign(value: &str, secret: &SecretString) -> Result<String, CookieError> {
    let mut mac = mac(secret)?;
    mac.update(value.as_bytes());
    let signature = Base64Unpadded::encode_string(&mac.finalize().into_bytes());
    Ok(format!("{SIGNED_COOKIE_PREFIX}{value}.{signature}"))
}

/// Verify a transport-signed value and return the original value.
#[must_use]
pub fn unsign(signed: &str, secret: &SecretString) -> Option<String> {
    let body = signed.strip_prefix(SIGNED_COOKIE_PREFIX)?;
    let (value, signature) = body.rsplit_once('.')?;
    let expected = Base64Unpadded::decode_vec(signature).ok()?;
    let mut mac = mac(secret).ok()?;
    mac.update(value.as_bytes());
    mac.verify_slice(&expected).ok()?;
    Some(value.to_string())
}

#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    signed: HashMap<String, String>,
    unsigned: HashMap<String, String>,
}

impl CookieJar {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secret: &SecretString) -> Self {
        let mut raw: HashMap<String, String> = HashMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for (name, value) in parse_pairs(value) {
                raw.entry(name).or_insert(value);
            }
        }

        let mut jar = Self::default();
        for (name, value) in raw {
            match unsign(&value, secret) {
                Some(verified) => {
                    jar.signed.insert(name, verified);
                }
                None => {
                    jar.unsigned.insert(name, value);
                }
            }
        }
        jar
    }

    /// Value whose transport signature verified.
    #[must_use]
    pub fn signed(&self, name: &str) -> Option<&str> {
        self.signed.get(name).map(String::as_str)
    }

    /// Value as received, for cookies that were never signed or failed verification.
    #[must_use]
    pub fn unsigned(&self, name: &str) -> Option<&str> {
        self.unsigned.get(name).map(String::as_str)
    }
}

fn parse_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            let value = urlencoding::decode(value)
                .map_or_else(|_| value.to_string(), |decoded| decoded.into_owned());
            Some((name.to_string(), value))
        })
        .collect()
}

/// Build the `Set-Cookie` value for a session token.
///
/// Max-Age is the token TTL, or the 400-day clamp for "stay connected" sessions.
///
/// # Errors
///
/// Returns an error if the value cannot be signed or is not a valid header.
pub fn session_cookie(
    config: &SessionConfig,
    name: &str,
    token: &str,
    stay_connected: bool,
) -> Result<HeaderValue, CookieError> {
    let signed = sign(token, config.cookie_secret())?;
    let max_age = if stay_connected {
        STAY_CONNECTED_MAX_AGE_SECONDS
    } else {
        config.token_ttl_seconds()
    };
    let cookie = format!(
        "{name}={}; Path=/; Max-Age={max_age}; HttpOnly; Secure; SameSite=Strict",
        urlencoding::encode(&signed)
    );
    Ok(HeaderValue::from_str(&cookie)?)
}

/// Build the `Set-Cookie` value that removes a session cookie.
///
/// # Errors
///
/// Returns an error if the cookie name is not a valid header value.
pub fn clear_session_cookie(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=Strict"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value)
    }

    fn cookie_headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(COOKIE, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn sign_and_unsign() {
        let signed = sign("H.P.S", &secret("k")).unwrap();
        assert!(signed.starts_with("s:H.P.S."));
        assert_eq!(unsign(&signed, &secret("k")).as_deref(), Some("H.P.S"));
        assert_eq!(unsign(&signed, &secret("other")), None);
    }

    #[test]
    fn tampered_value_fails() {
        let signed = sign("H.P.S", &secret("k")).unwrap();
        let tampered = signed.replacen("H.P.S", "H.P.X", 1);
        assert_eq!(unsign(&tampered, &secret("k")), None);
        assert_eq!(unsign("H.P.S", &secret("k")), None);
        assert_eq!(unsign("s:nodot", &secret("k")), None);
    }

    #[test]
    fn jar_splits_signed_and_unsigned() {
        let signed = sign("H.P.S", &secret("k")).unwrap();
        let header = format!(
            "admin={}; plain=abc; stale={}",
            urlencoding::encode(&signed),
            urlencoding::encode(&sign("A.B.C", &secret("old")).unwrap())
        );
        let jar = CookieJar::from_headers(&cookie_headers(&[&header]), &secret("k"));

        assert_eq!(jar.signed("admin"), Some("H.P.S"));
        assert_eq!(jar.unsigned("admin"), None);
        assert_eq!(jar.unsigned("plain"), Some("abc"));
        assert!(jar.unsigned("stale").unwrap().starts_with("s:A.B.C."));
        assert_eq!(jar.signed("stale"), None);
    }

    #[test]
    fn jar_first_occurrence_wins_across_headers() {
        let jar = CookieJar::from_headers(
            &cookie_headers(&["a=1; a=2", "a=3; b=\"quoted\""]),
            &secret("k"),
        );
        assert_eq!(jar.unsigned("a"), Some("1"));
        assert_eq!(jar.unsigned("b"), Some("quoted"));
    }

    #[test]
    fn jar_ignores_malformed_pairs() {
        let jar = CookieJar::from_headers(&cookie_headers(&["novalue; =x; c=%ZZ"]), &secret("k"));
        assert_eq!(jar.unsigned("novalue"), None);
        assert_eq!(jar.unsigned("c"), Some("%ZZ"));
    }

    #[test]
    fn session_cookie_attributes() {
        let config = SessionConfig::new("https://a.tld", "https://f.tld", secret("k"))
            .with_token_ttl_seconds(3600);

        let cookie = session_cookie(&config, "sid", "H.P.S", false).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("sid=s%3AH.P.S."));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));

        let cookie = session_cookie(&config, "sid", "H.P.S", true).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=34560000"));
    }

    #[test]
    fn written_cookie_reads_back_signed() {
        let config = SessionConfig::new("https://a.tld", "https://f.tld", secret("k"));
        let set_cookie = session_cookie(&config, "sid", "H.P.S", false).unwrap();
        let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();

        let jar = CookieJar::from_headers(&cookie_headers(&[&pair]), config.cookie_secret());
        assert_eq!(jar.signed("sid"), Some("H.P.S"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("sid").unwrap();
        assert!(cookie.to_str().unwrap().starts_with("sid=; Path=/; Max-Age=0"));
    }
}
