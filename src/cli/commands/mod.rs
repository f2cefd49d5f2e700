pub mod auth;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const CMD_SERVER: &str = "server";
pub const CMD_ISSUE: &str = "issue";

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_SUBJECT: &str = "subject";
pub const ARG_STAY_CONNECTED: &str = "stay-connected";
pub const ARG_COOKIE: &str = "cookie";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("passgate")
        .about("Session authentication gateway")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(server())
        .subcommand(issue());

    logging::with_args(command)
}

fn server() -> Command {
    let command = Command::new(CMD_SERVER)
        .about("Serve session validation over HTTP")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("PASSGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string for the account store")
                .env("PASSGATE_DSN")
                .hide_env_values(true)
                .required(true),
        );

    auth::with_args(command)
}

fn issue() -> Command {
    let command = Command::new(CMD_ISSUE)
        .about("Mint a session token for a subject")
        .arg(
            Arg::new(ARG_SUBJECT)
                .short('s')
                .long(ARG_SUBJECT)
                .help("Account id embedded as the token subject")
                .required(true),
        )
        .arg(
            Arg::new(ARG_STAY_CONNECTED)
                .long(ARG_STAY_CONNECTED)
                .help("Issue a token without expiry, bounded by the 400-day cookie max-age")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_COOKIE)
                .long(ARG_COOKIE)
                .help("Also print the Set-Cookie header for this surface")
                .value_parser(["admin", "frontend"]),
        );

    auth::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH_ARGS: [&str; 6] = [
        "--admin-origin",
        "https://admin.tld",
        "--frontend-origin",
        "https://www.tld",
        "--token-secret",
        "k",
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "passgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session authentication gateway".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_server_port_and_dsn() {
        temp_env::with_vars([("PASSGATE_PORT", None::<&str>)], || {
            let mut args = vec!["passgate", "server", "--dsn", "postgres://localhost/passgate"];
            args.extend(AUTH_ARGS);
            let matches = new().get_matches_from(args);

            let (name, sub) = matches.subcommand().unwrap();
            assert_eq!(name, CMD_SERVER);
            assert_eq!(sub.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                sub.get_one::<String>(ARG_DSN).cloned(),
                Some("postgres://localhost/passgate".to_string())
            );
        });
    }

    #[test]
    fn test_server_env() {
        temp_env::with_vars(
            [
                ("PASSGATE_PORT", Some("443")),
                ("PASSGATE_DSN", Some("postgres://localhost/passgate")),
                ("PASSGATE_ADMIN_ORIGIN", Some("https://admin.tld")),
                ("PASSGATE_FRONTEND_ORIGIN", Some("https://www.tld")),
                ("PASSGATE_TOKEN_SECRET", Some("k")),
                ("PASSGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["passgate", "server"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
                let sub = matches.subcommand_matches(CMD_SERVER).unwrap();
                assert_eq!(sub.get_one::<u16>(ARG_PORT).copied(), Some(443));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("PASSGATE_LOG_LEVEL", Some(level))], || {
                let mut args = vec!["passgate", "issue", "--subject", "u1"];
                args.extend(AUTH_ARGS);
                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("PASSGATE_LOG_LEVEL", None::<String>)], || {
                let mut args: Vec<String> = ["passgate", "issue", "--subject", "u1"]
                    .iter()
                    .chain(AUTH_ARGS.iter())
                    .map(ToString::to_string)
                    .collect();

                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_issue_args() {
        let mut args = vec![
            "passgate",
            "issue",
            "--subject",
            "u1",
            "--stay-connected",
            "--cookie",
            "admin",
        ];
        args.extend(AUTH_ARGS);
        let matches = new().get_matches_from(args);

        let sub = matches.subcommand_matches(CMD_ISSUE).unwrap();
        assert_eq!(sub.get_one::<String>(ARG_SUBJECT).cloned(), Some("u1".to_string()));
        assert!(sub.get_flag(ARG_STAY_CONNECTED));
        assert_eq!(sub.get_one::<String>(ARG_COOKIE).cloned(), Some("admin".to_string()));
    }

    #[test]
    fn test_issue_rejects_unknown_cookie_surface() {
        let mut args = vec!["passgate", "issue", "--subject", "u1", "--cookie", "mobile"];
        args.extend(AUTH_ARGS);
        let result = new().try_get_matches_from(args);
        assert_eq!(
            result.map_err(|e| e.kind()).err(),
            Some(clap::error::ErrorKind::InvalidValue)
        );
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(vec!["passgate"]);
        assert!(result.is_err());
    }
}
