//! Session authentication.
//!
//! Leaf-first: token codec, origin classifier, cookie transport and signature
//! recovery, credential selector, authorization policy, then the resolver that
//! ties them into one `verify(request)` call and the axum middleware around it.
//!
//! ## Cookie Secret Rotation
//!
//! Cookies signed under a previous secret fail their transport signature. Instead
//! of dropping the session, the embedded token is recovered and verified on its
//! own. Rotating the token secret, on the other hand, invalidates every session.

pub mod config;
pub mod cookies;
pub mod issuer;
pub mod middleware;
pub mod origin;
pub mod policy;
pub mod recover;
pub mod resolver;
pub mod selector;
pub mod store;
pub mod token;

pub use config::SessionConfig;
pub use issuer::{CookieSurface, IssuedSession, SessionIssuer};
pub use middleware::require_session;
pub use policy::{allowed_kinds, AccountKind, CallerClass};
pub use resolver::{AuthError, CallerId, SessionResolver};
pub use store::{AccountStore, MemoryAccountStore, PgAccountStore};
pub use token::{SessionClaims, TokenCodec, TokenError};
