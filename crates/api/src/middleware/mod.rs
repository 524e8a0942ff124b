//! Request extractors.
//!
//! - [`auth::AuthUser`] -- resolves the JWT bearer token into an `Actor`.

pub mod auth;
