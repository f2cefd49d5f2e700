//! Immutable session configuration shared by the resolver, codec and issuer.

use secrecy::SecretString;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;
pub const DEFAULT_ADMIN_COOKIE_NAME: &str = "pg-x-access-token-admin";
pub const DEFAULT_FRONTEND_COOKIE_NAME: &str = "pg-x-access-token-frontend";
pub const DEFAULT_TOKEN_HEADER: &str = "x-access-token";

/// Upper bound for "stay connected" cookies (user agents cap Max-Age at 400 days).
pub const STAY_CONNECTED_MAX_AGE_SECONDS: i64 = 400 * 24 * 60 * 60;

/// Strip trailing slashes so `https://admin.tld/` and `https://admin.tld` compare equal.
#[must_use]
pub fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    admin_origin: String,
    frontend_origin: String,
    token_secret: SecretString,
    cookie_secret: Option<SecretString>,
    token_ttl_seconds: i64,
    admin_cookie_name: String,
    frontend_cookie_name: String,
    token_header: String,
}

impl SessionConfig {
    #[must_use]
    pub fn new(admin_origin: &str, frontend_origin: &str, token_secret: SecretString) -> Self {
        Self {
            admin_origin: normalize_origin(admin_origin),
            frontend_origin: normalize_origin(frontend_origin),
            token_secret,
            cookie_secret: None,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            admin_cookie_name: DEFAULT_ADMIN_COOKIE_NAME.to_string(),
            frontend_cookie_name: DEFAULT_FRONTEND_COOKIE_NAME.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
        }
    }

    #[must_use]
    pub fn with_cookie_secret(mut self, secret: SecretString) -> Self {
        self.cookie_secret = Some(secret);
        self
    }

    /// Non-positive values make every non-extended `sign` fail with
    /// `TokenError::TtlOutOfRange`.
    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_admin_cookie_name(mut self, name: String) -> Self {
        self.admin_cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_frontend_cookie_name(mut self, name: String) -> Self {
        self.frontend_cookie_name = name;
        self
    }

    /// Header names are case-insensitive; stored lowercase.
    #[must_use]
    pub fn with_token_header(mut self, header: &str) -> Self {
        self.token_header = header.to_ascii_lowercase();
        self
    }

    #[must_use]
    pub fn admin_origin(&self) -> &str {
        &self.admin_origin
    }

    #[must_use]
    pub fn frontend_origin(&self) -> &str {
        &self.frontend_origin
    }

    pub(crate) fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    /// Cookie signatures fall back to the token secret when no dedicated secret is set.
    pub(crate) fn cookie_secret(&self) -> &SecretString {
        self.cookie_secret.as_ref().unwrap_or(&self.token_secret)
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn admin_cookie_name(&self) -> &str {
        &self.admin_cookie_name
    }

    #[must_use]
    pub fn frontend_cookie_name(&self) -> &str {
        &self.frontend_cookie_name
    }

    #[must_use]
    pub fn token_header(&self) -> &str {
        &self.token_header
    }

    /// Both surfaces served from the same origin.
    #[must_use]
    pub fn is_shared_host(&self) -> bool {
        self.admin_origin == self.frontend_origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn config() -> SessionConfig {
        SessionConfig::new(
            "https://admin.example.com/",
            "https://www.example.com",
            SecretString::from("token-secret"),
        )
    }

    #[test]
    fn normalize_origin_strips_trailing_slashes() {
        assert_eq!(normalize_origin("https://a.tld/"), "https://a.tld");
        assert_eq!(normalize_origin("https://a.tld//"), "https://a.tld");
        assert_eq!(normalize_origin("https://a.tld"), "https://a.tld");
    }

    #[test]
    fn origins_are_normalized_on_construction() {
        let config = config();
        assert_eq!(config.admin_origin(), "https://admin.example.com");
        assert_eq!(config.frontend_origin(), "https://www.example.com");
        assert!(!config.is_shared_host());
    }

    #[test]
    fn cookie_secret_defaults_to_token_secret() {
        let config = config();
        assert_eq!(config.cookie_secret().expose_secret(), "token-secret");

        let config = config.with_cookie_secret(SecretString::from("cookie-secret"));
        assert_eq!(config.cookie_secret().expose_secret(), "cookie-secret");
        assert_eq!(config.token_secret().expose_secret(), "token-secret");
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = config()
            .with_token_ttl_seconds(60)
            .with_admin_cookie_name("a".to_string())
            .with_frontend_cookie_name("f".to_string())
            .with_token_header("X-Token");
        assert_eq!(config.token_ttl_seconds(), 60);
        assert_eq!(config.admin_cookie_name(), "a");
        assert_eq!(config.frontend_cookie_name(), "f");
        assert_eq!(config.token_header(), "x-token");
    }

    #[test]
    fn shared_host_detected() {
        let config = SessionConfig::new(
            "https://example.com",
            "https://example.com/",
            SecretString::from("s"),
        );
        assert!(config.is_shared_host());
    }
}
