use crate::{api, auth::SessionConfig, cli::telemetry};
use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session: SessionConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        admin_origin = args.session.admin_origin(),
        frontend_origin = args.session.frontend_origin(),
        shared_host = args.session.is_shared_host(),
        token_ttl_seconds = args.session.token_ttl_seconds(),
        "Starting passgate"
    );

    let result = api::new(args.port, args.dsn, args.session).await;

    telemetry::shutdown_tracer();

    result
}
