//! Authentication primitives.
//!
//! - [`jwt`] -- Bearer token validation (and issuing, for the identity
//!   service and tests).

pub mod jwt;
