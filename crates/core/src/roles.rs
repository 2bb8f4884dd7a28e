//! Principal roles.
//!
//! These must match the seed data of the `roles` lookup table in the initial
//! migration.

use crate::status::StatusId;

pub const ROLE_USER: &str = "user";
pub const ROLE_AGENT: &str = "agent";
pub const ROLE_ADMIN: &str = "admin";

define_status_enum! {
    /// Role of an authenticated principal.
    ///
    /// Privilege is ordered `Admin` over `Agent` over `User` for ticket
    /// management. Ticket ownership is checked separately.
    Role ("role") {
        User = 1 => "user",
        Agent = 2 => "agent",
        Admin = 3 => "admin",
    }
}

impl Role {
    /// Agents and admins: the roles that triage tickets.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Resolve the role id of a stored user row, treating unknown ids as the
/// least privileged role.
pub fn role_from_id_or_user(id: StatusId) -> Role {
    Role::from_id(id).unwrap_or_default()
}
