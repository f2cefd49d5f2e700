//! Credential selection.
//!
//! Exactly one credential is trusted per request. The choice is an ordered rule
//! table over the origin match and the credentials presented; the first matching
//! rule decides both the credential and the caller class. Requests that match no
//! rule carry no credential.

use axum::http::HeaderMap;

use super::{
    config::SessionConfig,
    cookies::CookieJar,
    origin::OriginMatch,
    policy::CallerClass,
    recover::recover,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Cookie,
    Header,
}

/// A credential as presented by the client. Built per request, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub raw_value: String,
    pub transport: Transport,
    /// The cookie transport signature verified.
    pub signed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    AdminCookie,
    FrontendCookie,
    TokenHeader,
}

/// Credentials found on the request, one slot per source.
#[derive(Clone, Debug, Default)]
pub struct Presented {
    pub admin_cookie: Option<Credential>,
    pub frontend_cookie: Option<Credential>,
    pub token_header: Option<Credential>,
}

impl Presented {
    /// Collect credentials, preferring transport-verified cookie values and
    /// recovering the embedded token from unverified ones.
    #[must_use]
    pub fn from_request(headers: &HeaderMap, jar: &CookieJar, config: &SessionConfig) -> Self {
        let token_header = headers
            .get(config.token_header())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Credential {
                raw_value: value.to_string(),
                transport: Transport::Header,
                signed: false,
            });

        Self {
            admin_cookie: cookie_credential(jar, config.admin_cookie_name()),
            frontend_cookie: cookie_credential(jar, config.frontend_cookie_name()),
            token_header,
        }
    }

    fn take(self, source: Source) -> Option<Credential> {
        match source {
            Source::AdminCookie => self.admin_cookie,
            Source::FrontendCookie => self.frontend_cookie,
            Source::TokenHeader => self.token_header,
        }
    }
}

fn cookie_credential(jar: &CookieJar, name: &str) -> Option<Credential> {
    if let Some(value) = jar.signed(name).filter(|value| !value.is_empty()) {
        return Some(Credential {
            raw_value: value.to_string(),
            transport: Transport::Cookie,
            signed: true,
        });
    }
    jar.unsigned(name)
        .filter(|value| !value.is_empty())
        .map(|raw| Credential {
            raw_value: recover(raw),
            transport: Transport::Cookie,
            signed: false,
        })
}

pub struct Rule {
    pub name: &'static str,
    applies: fn(OriginMatch, &Presented) -> bool,
    pub source: Source,
    pub class: CallerClass,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

/// Customer self-service: an admin console session is accepted as a frontend
/// credential when the public site has no session of its own. Used by the
/// frontend-origin and shared-host fallback rules.
fn admin_cookie_fallback(presented: &Presented) -> bool {
    presented.frontend_cookie.is_none() && presented.admin_cookie.is_some()
}

fn frontend_origin(origin: OriginMatch, presented: &Presented) -> bool {
    origin.frontend_only() && presented.frontend_cookie.is_some()
}

fn frontend_origin_fallback(origin: OriginMatch, presented: &Presented) -> bool {
    origin.frontend_only() && admin_cookie_fallback(presented)
}

fn admin_origin(origin: OriginMatch, presented: &Presented) -> bool {
    origin.admin_only() && presented.admin_cookie.is_some()
}

fn shared_host(origin: OriginMatch, presented: &Presented) -> bool {
    origin.shared() && presented.frontend_cookie.is_some()
}

fn shared_host_fallback(origin: OriginMatch, presented: &Presented) -> bool {
    origin.shared() && admin_cookie_fallback(presented)
}

fn unmatched_admin_cookie(origin: OriginMatch, presented: &Presented) -> bool {
    origin.none() && presented.admin_cookie.is_some()
}

fn unmatched_frontend_cookie(origin: OriginMatch, presented: &Presented) -> bool {
    origin.none() && presented.frontend_cookie.is_some()
}

fn token_header(_origin: OriginMatch, presented: &Presented) -> bool {
    presented.token_header.is_some()
}

pub const ADMIN_COOKIE_FRONTEND_FALLBACK: &str = "admin-cookie-frontend-fallback";
pub const SHARED_HOST_ADMIN_COOKIE_FALLBACK: &str = "shared-host-admin-cookie-fallback";

/// Evaluated top-down; the first rule that applies wins.
pub static RULES: [Rule; 8] = [
    Rule {
        name: "frontend-origin",
        applies: frontend_origin,
        source: Source::FrontendCookie,
        class: CallerClass::Frontend,
    },
    Rule {
        name: ADMIN_COOKIE_FRONTEND_FALLBACK,
        applies: frontend_origin_fallback,
        source: Source::AdminCookie,
        class: CallerClass::Frontend,
    },
    Rule {
        name: "admin-origin",
        applies: admin_origin,
        source: Source::AdminCookie,
        class: CallerClass::Admin,
    },
    Rule {
        name: "shared-host",
        applies: shared_host,
        source: Source::FrontendCookie,
        class: CallerClass::Frontend,
    },
    Rule {
        name: SHARED_HOST_ADMIN_COOKIE_FALLBACK,
        applies: shared_host_fallback,
        source: Source::AdminCookie,
        class: CallerClass::Frontend,
    },
    Rule {
        name: "unmatched-origin-admin-cookie",
        applies: unmatched_admin_cookie,
        source: Source::AdminCookie,
        class: CallerClass::Admin,
    },
    Rule {
        name: "unmatched-origin-frontend-cookie",
        applies: unmatched_frontend_cookie,
        source: Source::FrontendCookie,
        class: CallerClass::Frontend,
    },
    Rule {
        name: "token-header",
        applies: token_header,
        source: Source::TokenHeader,
        class: CallerClass::Mobile,
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub credential: Credential,
    pub class: CallerClass,
    pub rule: &'static str,
}

/// Pick the single trusted credential, or `None` when nothing usable was presented.
#[must_use]
pub fn select(origin: OriginMatch, presented: Presented) -> Option<Selection> {
    let rule = RULES.iter().find(|rule| (rule.applies)(origin, &presented))?;
    let credential = presented.take(rule.source)?;
    Some(Selection {
        credential,
        class: rule.class,
        rule: rule.name,
    })
}
