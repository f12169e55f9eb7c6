//! Trip lifecycle domain logic.
//!
//! This crate has no database dependency. Repositories and handlers pass
//! plain data in and get decisions back: endpoint resolution, status
//! workflow rules, dashboard window/count policy and RBAC checks.

pub mod dashboard;
pub mod error;
pub mod hierarchy;
pub mod rbac;
pub mod roles;
pub mod search;
pub mod trip_status;
pub mod types;
