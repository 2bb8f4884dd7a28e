//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated principal from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireStaff`] -- requires `agent` or `admin`.
//! - [`rbac::RequireAuth`] -- requires any authenticated user.

pub mod auth;
pub mod rbac;
