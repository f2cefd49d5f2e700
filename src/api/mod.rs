use crate::{
    api::handlers::{health, session},
    auth::{require_session, PgAccountStore, SessionConfig, SessionResolver},
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;

pub(crate) mod handlers;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, session::validate, session::sign_out),
    components(schemas(health::Health, session::ValidateResponse)),
    tags(
        (name = "health", description = "Service health"),
        (name = "session", description = "Session validation and sign-out")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the database or to start the server
pub async fn new(port: u16, dsn: String, session_config: SessionConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgAccountStore::new(pool));
    let resolver = Arc::new(SessionResolver::new(session_config, store));
    let app = app(resolver)?;

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

/// Build the application router: public routes, session-protected routes and the
/// shared request-id, tracing and CORS layers.
///
/// # Errors
/// Returns an error if a configured origin or the token header name is invalid.
pub fn app(resolver: Arc<SessionResolver>) -> Result<Router> {
    let config = resolver.config();

    let mut origins = vec![origin_header(config.admin_origin())?];
    if !config.is_shared_host() {
        origins.push(origin_header(config.frontend_origin())?);
    }
    let token_header = HeaderName::from_bytes(config.token_header().as_bytes())
        .with_context(|| format!("Invalid token header name: {}", config.token_header()))?;

    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, token_header])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    let protected = Router::new()
        .route("/v1/session/validate", post(session::validate))
        .route_layer(middleware::from_fn_with_state(
            resolver.clone(),
            require_session,
        ));

    let app = Router::new()
        .route("/health", get(health::health).options(health::health))
        .route("/v1/session/sign-out", post(session::sign_out))
        .route("/openapi.json", get(openapi_json))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(resolver)),
        );

    Ok(app)
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Reduce a configured site URL to the `scheme://host[:port]` form browsers send.
fn origin_header(base_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(base_url).with_context(|| format!("Invalid site origin: {base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Site origin must include a valid host: {base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_header_drops_path_and_default_port() {
        assert_eq!(
            origin_header("https://admin.tld:443/").unwrap(),
            "https://admin.tld"
        );
        assert_eq!(
            origin_header("http://localhost:3001").unwrap(),
            "http://localhost:3001"
        );
        assert!(origin_header("not a url").is_err());
    }
}
