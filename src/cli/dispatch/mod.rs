//! Maps parsed CLI arguments to the action the binary executes.

use crate::auth::CookieSurface;
use crate::cli::actions::{issue, server, Action};
use crate::cli::commands::{
    auth, ARG_COOKIE, ARG_DSN, ARG_PORT, ARG_STAY_CONNECTED, ARG_SUBJECT, CMD_ISSUE, CMD_SERVER,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_SERVER, sub)) => server_action(sub),
        Some((CMD_ISSUE, sub)) => issue_action(sub),
        Some((other, _)) => Err(anyhow!("unknown subcommand: {other}")),
        None => Err(anyhow!("missing subcommand")),
    }
}

fn server_action(matches: &ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let session = auth::Options::parse(matches)?.into_session_config();

    Ok(Action::Server(server::Args { port, dsn, session }))
}

fn issue_action(matches: &ArgMatches) -> Result<Action> {
    let subject = matches
        .get_one::<String>(ARG_SUBJECT)
        .cloned()
        .filter(|subject| !subject.is_empty())
        .context("missing required argument: --subject")?;

    let surface = match matches.get_one::<String>(ARG_COOKIE).map(String::as_str) {
        Some("admin") => Some(CookieSurface::Admin),
        Some("frontend") => Some(CookieSurface::Frontend),
        Some(other) => return Err(anyhow!("unknown cookie surface: {other}")),
        None => None,
    };

    let session = auth::Options::parse(matches)?.into_session_config();

    Ok(Action::Issue(issue::Args {
        subject,
        stay_connected: matches.get_flag(ARG_STAY_CONNECTED),
        surface,
        session,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn server_action_carries_session_config() {
        temp_env::with_vars(
            [
                ("PASSGATE_DSN", Some("postgres://localhost/passgate")),
                ("PASSGATE_ADMIN_ORIGIN", Some("https://admin.tld")),
                ("PASSGATE_FRONTEND_ORIGIN", Some("https://www.tld/")),
                ("PASSGATE_TOKEN_SECRET", Some("k")),
                ("PASSGATE_PORT", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["passgate", "server"]);
                let Action::Server(args) = handler(&matches).unwrap() else {
                    panic!("expected server action");
                };
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://localhost/passgate");
                assert_eq!(args.session.frontend_origin(), "https://www.tld");
            },
        );
    }

    #[test]
    fn issue_action_maps_cookie_surface() {
        temp_env::with_vars(
            [
                ("PASSGATE_ADMIN_ORIGIN", Some("https://admin.tld")),
                ("PASSGATE_FRONTEND_ORIGIN", Some("https://www.tld")),
                ("PASSGATE_TOKEN_SECRET", Some("k")),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "passgate",
                    "issue",
                    "--subject",
                    "u1",
                    "--cookie",
                    "frontend",
                ]);
                let Action::Issue(args) = handler(&matches).unwrap() else {
                    panic!("expected issue action");
                };
                assert_eq!(args.subject, "u1");
                assert!(!args.stay_connected);
                assert_eq!(args.surface, Some(CookieSurface::Frontend));
            },
        );
    }

    #[test]
    fn invalid_origin_fails_dispatch() {
        temp_env::with_vars(
            [
                ("PASSGATE_ADMIN_ORIGIN", Some("not an origin")),
                ("PASSGATE_FRONTEND_ORIGIN", Some("https://www.tld")),
                ("PASSGATE_TOKEN_SECRET", Some("k")),
            ],
            || {
                let matches = commands::new()
                    .get_matches_from(vec!["passgate", "issue", "--subject", "u1"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err.to_string().contains("invalid --admin-origin"));
                }
            },
        );
    }
}
