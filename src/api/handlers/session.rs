//! Session endpoints for token validation and sign-out.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::{cookies::clear_session_cookie, CallerId, SessionResolver};

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ValidateResponse {
    pub id: String,
}

#[utoipa::path(
    post,
    path = "/v1/session/validate",
    responses(
        (status = 200, description = "Session is valid", body = ValidateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No token provided")
    ),
    tag = "session"
)]
pub async fn validate(Extension(caller): Extension<CallerId>) -> impl IntoResponse {
    let response = ValidateResponse {
        id: caller.as_str().to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    post,
    path = "/v1/session/sign-out",
    responses(
        (status = 204, description = "Session cookies cleared")
    ),
    tag = "session"
)]
pub async fn sign_out(resolver: Extension<Arc<SessionResolver>>) -> impl IntoResponse {
    let config = resolver.config();

    // Always clear both cookies; the caller may hold either surface's session.
    let mut headers = HeaderMap::new();
    for name in [config.admin_cookie_name(), config.frontend_cookie_name()] {
        match clear_session_cookie(name) {
            Ok(cookie) => {
                headers.append(SET_COOKIE, cookie);
            }
            Err(err) => error!("Failed to build clear cookie for {name}: {err}"),
        }
    }
    (StatusCode::NO_CONTENT, headers)
}
