//! # Passgate (session authentication gateway)
//!
//! `passgate` decides, for every inbound request, who is calling and whether they
//! may pass. Three client populations share one account collection:
//!
//! - the **admin console** (admin-site origin, admin session cookie),
//! - the **public frontend** (public-site origin, frontend session cookie),
//! - **mobile and service clients** (custom token header, no cookies).
//!
//! ## Credentials
//!
//! Sessions are stateless HS256 tokens carrying the subject id, an issued-at and an
//! optional expiry. "Stay connected" tokens carry no expiry and are bounded by the
//! 400-day cookie max-age instead. Cookies are additionally signed at the transport
//! level (`s:` marker, HMAC-SHA256); when that signature fails after a secret
//! rotation, the embedded token is recovered and re-verified rather than dropped.
//!
//! ## Trust Boundary
//!
//! Requests authenticated through the admin boundary may only resolve to `admin`
//! or `supplier` accounts. A missing account and an account of a disallowed kind
//! produce the same `401 Unauthorized`, so the response never reveals whether an
//! account exists. A request that presents no credential at all receives
//! `403 No token provided`.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
