//! Session resolution: the single choke point for every protected route.
//!
//! Flow Overview:
//! 1) Classify the request origin.
//! 2) Select one credential and a caller class; recover unverified cookies.
//! 3) Verify the token.
//! 4) Look up the subject restricted to the kinds the caller class allows.
//!
//! Security boundaries: failures are distinguished internally for logging only.
//! Externally there are two answers, 403 when nothing was presented and 401 for
//! everything else, so callers cannot tell a forged token from a missing or
//! disallowed account.

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument};

use super::{
    config::SessionConfig,
    cookies::CookieJar,
    origin::OriginClassifier,
    policy::{allowed_kinds, CallerClass},
    recover::is_token_shaped,
    selector::{select, Presented},
    store::AccountStore,
    token::{TokenCodec, TokenError},
};

pub const NO_TOKEN_BODY: &str = "No token provided";
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no credential presented")]
    NoCredential,
    #[error("credential is not a token")]
    TokenMalformed,
    #[error("token rejected")]
    TokenInvalid(#[source] TokenError),
    #[error("account not found for caller class")]
    Unauthorized,
    #[error("account lookup failed")]
    Store(#[source] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoCredential => StatusCode::FORBIDDEN,
            Self::TokenMalformed | Self::TokenInvalid(_) | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::NoCredential => (status, NO_TOKEN_BODY).into_response(),
            Self::Store(_) => status.into_response(),
            _ => (status, UNAUTHORIZED_BODY).into_response(),
        }
    }
}

/// Identity handed to protected handlers. Only the subject id comes from the token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallerId {
    subject: String,
    class: CallerClass,
}

impl CallerId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn class(&self) -> CallerClass {
        self.class
    }
}

pub struct SessionResolver {
    config: SessionConfig,
    classifier: OriginClassifier,
    codec: TokenCodec,
    store: Arc<dyn AccountStore>,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl SessionResolver {
    #[must_use]
    pub fn new(config: SessionConfig, store: Arc<dyn AccountStore>) -> Self {
        Self {
            classifier: OriginClassifier::new(&config),
            codec: TokenCodec::from_config(&config),
            config,
            store,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Resolve the caller of a request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when no credential is presented, the token does not
    /// verify, or no account of an allowed kind exists for its subject.
    #[instrument(skip_all)]
    pub async fn verify(&self, headers: &HeaderMap) -> Result<CallerId, AuthError> {
        let origin = self.classifier.classify(headers);
        let jar = CookieJar::from_headers(headers, self.config.cookie_secret());
        let presented = Presented::from_request(headers, &jar, &self.config);

        let Some(selection) = select(origin, presented) else {
            debug!(?origin, "no credential presented");
            return Err(AuthError::NoCredential);
        };
        debug!(
            rule = selection.rule,
            class = %selection.class,
            signed = selection.credential.signed,
            "credential selected"
        );

        let token = selection.credential.raw_value;
        if !is_token_shaped(&token) {
            debug!("credential is not a three-segment token");
            return Err(AuthError::TokenMalformed);
        }

        let claims = self.codec.verify(&token).map_err(|err| {
            debug!("token rejected: {err}");
            AuthError::TokenInvalid(err)
        })?;

        match self
            .store
            .exists(&claims.sub, allowed_kinds(selection.class))
            .await
        {
            Ok(true) => Ok(CallerId {
                subject: claims.sub,
                class: selection.class,
            }),
            Ok(false) => {
                debug!(class = %selection.class, "no account of an allowed kind");
                Err(AuthError::Unauthorized)
            }
            Err(err) => {
                error!("Failed to lookup account: {err:#}");
                Err(AuthError::Store(err))
            }
        }
    }
}
