//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::Authorized`] -- Adds the caller's resolved permission matrix.

pub mod auth;
pub mod rbac;
