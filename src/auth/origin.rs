//! Classify the request's declared `Origin` against the admin and public sites.

use axum::http::{header::ORIGIN, HeaderMap};

use super::config::{normalize_origin, SessionConfig};

/// Which configured sites the request origin matched. Both flags may be set when
/// the admin console and the public site share a host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OriginMatch {
    pub admin: bool,
    pub frontend: bool,
}

impl OriginMatch {
    #[must_use]
    pub fn admin_only(self) -> bool {
        self.admin && !self.frontend
    }

    #[must_use]
    pub fn frontend_only(self) -> bool {
        self.frontend && !self.admin
    }

    #[must_use]
    pub fn shared(self) -> bool {
        self.admin && self.frontend
    }

    #[must_use]
    pub fn none(self) -> bool {
        !self.admin && !self.frontend
    }
}

#[derive(Clone, Debug)]
pub struct OriginClassifier {
    admin_origin: String,
    frontend_origin: String,
}

impl OriginClassifier {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            admin_origin: config.admin_origin().to_string(),
            frontend_origin: config.frontend_origin().to_string(),
        }
    }

    #[must_use]
    pub fn is_admin_origin(&self, headers: &HeaderMap) -> bool {
        request_origin(headers).is_some_and(|origin| origin == self.admin_origin)
    }

    #[must_use]
    pub fn is_frontend_origin(&self, headers: &HeaderMap) -> bool {
        request_origin(headers).is_some_and(|origin| origin == self.frontend_origin)
    }

    #[must_use]
    pub fn classify(&self, headers: &HeaderMap) -> OriginMatch {
        let Some(origin) = request_origin(headers) else {
            return OriginMatch::default();
        };
        OriginMatch {
            admin: origin == self.admin_origin,
            frontend: origin == self.frontend_origin,
        }
    }
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(ORIGIN)?.to_str().ok()?;
    let origin = normalize_origin(value);
    if origin.is_empty() {
        None
    } else {
        Some(origin)
    }
}
