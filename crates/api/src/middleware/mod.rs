//! Request extractors for authentication, authorization and request
//! metadata.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`rbac::RequireSuperAdmin`] -- requires the `superadmin` role.
//! - [`rbac::RequireAdmin`] -- requires `superadmin` or `projectadmin`.
//! - [`api_key::ProjectApiKey`] -- the project behind an `x-api-key` header.
//! - [`client::ClientInfo`] -- caller IP and user agent for audit entries.

pub mod api_key;
pub mod auth;
pub mod client;
pub mod rbac;
