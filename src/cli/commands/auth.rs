//! Session arguments shared by every subcommand that signs or verifies tokens.

use crate::auth::{
    config::{
        DEFAULT_ADMIN_COOKIE_NAME, DEFAULT_FRONTEND_COOKIE_NAME, DEFAULT_TOKEN_HEADER,
        DEFAULT_TOKEN_TTL_SECONDS, STAY_CONNECTED_MAX_AGE_SECONDS,
    },
    SessionConfig,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_ADMIN_ORIGIN: &str = "admin-origin";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";
pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_COOKIE_SECRET: &str = "cookie-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_ADMIN_COOKIE_NAME: &str = "admin-cookie-name";
pub const ARG_FRONTEND_COOKIE_NAME: &str = "frontend-cookie-name";
pub const ARG_TOKEN_HEADER: &str = "token-header";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_origin_args(command);
    let command = with_secret_args(command);
    with_transport_args(command)
}

fn with_origin_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_ORIGIN)
                .long(ARG_ADMIN_ORIGIN)
                .help("Admin console origin, example: https://admin.passgate.dev")
                .env("PASSGATE_ADMIN_ORIGIN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long(ARG_FRONTEND_ORIGIN)
                .help("Public frontend origin, may equal the admin origin")
                .env("PASSGATE_FRONTEND_ORIGIN")
                .required(true),
        )
}

fn with_secret_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("HMAC secret used to sign session tokens")
                .env("PASSGATE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECRET)
                .long(ARG_COOKIE_SECRET)
                .help("HMAC secret used to sign session cookies (default: token secret)")
                .env("PASSGATE_COOKIE_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token TTL in seconds")
                .env("PASSGATE_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(
                    clap::value_parser!(i64).range(1..=STAY_CONNECTED_MAX_AGE_SECONDS),
                ),
        )
}

fn with_transport_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_COOKIE_NAME)
                .long(ARG_ADMIN_COOKIE_NAME)
                .help("Admin session cookie name")
                .env("PASSGATE_ADMIN_COOKIE_NAME")
                .default_value(DEFAULT_ADMIN_COOKIE_NAME),
        )
        .arg(
            Arg::new(ARG_FRONTEND_COOKIE_NAME)
                .long(ARG_FRONTEND_COOKIE_NAME)
                .help("Frontend session cookie name")
                .env("PASSGATE_FRONTEND_COOKIE_NAME")
                .default_value(DEFAULT_FRONTEND_COOKIE_NAME),
        )
        .arg(
            Arg::new(ARG_TOKEN_HEADER)
                .long(ARG_TOKEN_HEADER)
                .help("Request header carrying mobile and service tokens")
                .env("PASSGATE_TOKEN_HEADER")
                .default_value(DEFAULT_TOKEN_HEADER),
        )
}

#[derive(Debug)]
pub struct Options {
    pub admin_origin: String,
    pub frontend_origin: String,
    pub token_secret: SecretString,
    pub cookie_secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub admin_cookie_name: String,
    pub frontend_cookie_name: String,
    pub token_header: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing or an origin is not a URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let string = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .with_context(|| format!("missing required argument: --{id}"))
        };

        let admin_origin = string(ARG_ADMIN_ORIGIN)?;
        let frontend_origin = string(ARG_FRONTEND_ORIGIN)?;
        validate_origin(ARG_ADMIN_ORIGIN, &admin_origin)?;
        validate_origin(ARG_FRONTEND_ORIGIN, &frontend_origin)?;

        let token_secret = string(ARG_TOKEN_SECRET)?;
        if token_secret.is_empty() {
            return Err(anyhow!("--{ARG_TOKEN_SECRET} must not be empty"));
        }

        Ok(Self {
            admin_origin,
            frontend_origin,
            token_secret: SecretString::from(token_secret),
            cookie_secret: matches
                .get_one::<String>(ARG_COOKIE_SECRET)
                .filter(|secret| !secret.is_empty())
                .map(|secret| SecretString::from(secret.clone())),
            token_ttl_seconds: matches
                .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
            admin_cookie_name: string(ARG_ADMIN_COOKIE_NAME)?,
            frontend_cookie_name: string(ARG_FRONTEND_COOKIE_NAME)?,
            token_header: string(ARG_TOKEN_HEADER)?,
        })
    }

    #[must_use]
    pub fn into_session_config(self) -> SessionConfig {
        let config = SessionConfig::new(
            &self.admin_origin,
            &self.frontend_origin,
            self.token_secret,
        )
        .with_token_ttl_seconds(self.token_ttl_seconds)
        .with_admin_cookie_name(self.admin_cookie_name)
        .with_frontend_cookie_name(self.frontend_cookie_name)
        .with_token_header(&self.token_header);

        match self.cookie_secret {
            Some(secret) => config.with_cookie_secret(secret),
            None => config,
        }
    }
}

fn validate_origin(arg: &str, origin: &str) -> Result<()> {
    let parsed = Url::parse(origin).with_context(|| format!("invalid --{arg}: {origin}"))?;
    if parsed.host_str().is_none() {
        return Err(anyhow!("--{arg} must include a host: {origin}"));
    }
    Ok(())
}
