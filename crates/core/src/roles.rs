//! Well-known role name constants.
//!
//! These must match the `users_role_check` constraint in the initial
//! migration.

pub const ROLE_SUPERADMIN: &str = "superadmin";
pub const ROLE_PROJECT_ADMIN: &str = "projectadmin";
pub const ROLE_USER: &str = "user";

/// Every role a user row may carry.
pub const ALL_ROLES: [&str; 3] = [ROLE_SUPERADMIN, ROLE_PROJECT_ADMIN, ROLE_USER];

/// Whether `role` is one of the known role names.
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}
