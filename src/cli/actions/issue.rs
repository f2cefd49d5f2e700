use crate::auth::{CookieSurface, SessionConfig, SessionIssuer};
use anyhow::{Context, Result};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub subject: String,
    pub stay_connected: bool,
    pub surface: Option<CookieSurface>,
    pub session: SessionConfig,
}

/// Mint a session token and print it, followed by the `Set-Cookie` header when a
/// cookie surface was requested.
/// # Errors
/// Returns an error if the token or cookie cannot be produced.
pub fn execute(args: &Args) -> Result<()> {
    let issued = SessionIssuer::new(args.session.clone())
        .issue(&args.subject, args.stay_connected, args.surface)
        .context("Failed to issue session")?;

    debug!(subject = %args.subject, "token issued");

    println!("{}", issued.token);
    if let Some(cookie) = issued.set_cookie {
        let cookie = cookie.to_str().context("Set-Cookie is not valid ASCII")?;
        println!("Set-Cookie: {cookie}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn issue_prints_without_error() {
        let args = Args {
            subject: "u1".to_string(),
            stay_connected: true,
            surface: Some(CookieSurface::Admin),
            session: SessionConfig::new(
                "https://admin.tld",
                "https://www.tld",
                SecretString::from("k"),
            ),
        };
        assert!(execute(&args).is_ok());
    }
}
