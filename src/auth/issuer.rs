//! Session issuance for sign-in collaborators and service tokens.

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::debug;

use super::{
    config::SessionConfig,
    cookies::{session_cookie, CookieError},
    token::{SessionClaims, TokenCodec, TokenError},
};

/// Which session cookie a token is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CookieSurface {
    Admin,
    Frontend,
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Cookie(#[from] CookieError),
}

#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    /// `Set-Cookie` value, absent for header-only (mobile/service) sessions.
    pub set_cookie: Option<HeaderValue>,
}

#[derive(Clone, Debug)]
pub struct SessionIssuer {
    config: SessionConfig,
    codec: TokenCodec,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            codec: TokenCodec::from_config(&config),
            config,
        }
    }

    /// Mint a token for `subject`, plus the cookie for `surface` if one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or the cookie cannot be produced.
    pub fn issue(
        &self,
        subject: &str,
        stay_connected: bool,
        surface: Option<CookieSurface>,
    ) -> Result<IssuedSession, IssueError> {
        let token = self.codec.sign(SessionClaims::new(subject), stay_connected)?;

        let set_cookie = match surface {
            Some(surface) => {
                let name = match surface {
                    CookieSurface::Admin => self.config.admin_cookie_name(),
                    CookieSurface::Frontend => self.config.frontend_cookie_name(),
                };
                Some(session_cookie(&self.config, name, &token, stay_connected)?)
            }
            None => None,
        };

        debug!(?surface, stay_connected, "session issued");

        Ok(IssuedSession { token, set_cookie })
    }
}
