use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::resolver::SessionResolver;

/// Resolve the caller before any protected handler runs and attach its
/// [`CallerId`](super::CallerId) to the request extensions.
pub async fn require_session(
    State(resolver): State<Arc<SessionResolver>>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolver.verify(request.headers()).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
