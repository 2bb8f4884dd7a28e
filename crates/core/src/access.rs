//! Ticket authorization.
//!
//! Every ticket operation asks [`authorize`] before touching storage. The
//! rules are pure functions of the principal, the action and the ticket's
//! ownership, so they are tested here without a database.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: DbId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// The ownership facts about a ticket that authorization depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketOwnership {
    pub created_by: DbId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketAction {
    View,
    Update,
    Delete,
    Assign,
    Comment,
    Vote,
}

/// Which ticket fields an update may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketFieldMask {
    pub subject: bool,
    pub description: bool,
    pub status: bool,
    pub priority: bool,
    pub assigned_to: bool,
}

impl TicketFieldMask {
    pub const ALL: TicketFieldMask = TicketFieldMask {
        subject: true,
        description: true,
        status: true,
        priority: true,
        assigned_to: true,
    };

    /// Text fields only: what a ticket's creator may edit.
    pub const CONTENT: TicketFieldMask = TicketFieldMask {
        subject: true,
        description: true,
        status: false,
        priority: false,
        assigned_to: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    AllowFields(TicketFieldMask),
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Decision::Deny(_))
    }

    /// Convert into the field mask to apply, or `Forbidden` on denial.
    pub fn into_mask(self) -> Result<TicketFieldMask, CoreError> {
        match self {
            Decision::Allow => Ok(TicketFieldMask::ALL),
            Decision::AllowFields(mask) => Ok(mask),
            Decision::Deny(reason) => Err(CoreError::Forbidden(reason.to_string())),
        }
    }

    /// Convert into `Ok(())`, or `Forbidden` on denial.
    pub fn require(self) -> Result<(), CoreError> {
        self.into_mask().map(|_| ())
    }
}

const DENY_NOT_OWNER: &str = "You do not have access to this ticket";
const DENY_DELETE: &str = "Only the ticket creator or an admin can delete this ticket";
const DENY_ASSIGN: &str = "Only agents and admins can assign tickets";

/// The single authorization predicate for ticket operations.
///
/// - View, Comment, Vote: staff always; users only on their own tickets.
/// - Update: the view rule, then a field mask. Staff may change every field,
///   the creator only subject and description.
/// - Delete: the creator or an admin.
/// - Assign: staff only.
pub fn authorize(principal: &Principal, action: TicketAction, ticket: &TicketOwnership) -> Decision {
    let is_owner = principal.user_id == ticket.created_by;
    let can_view = principal.is_staff() || is_owner;

    match action {
        TicketAction::View | TicketAction::Comment | TicketAction::Vote => {
            if can_view {
                Decision::Allow
            } else {
                Decision::Deny(DENY_NOT_OWNER)
            }
        }
        TicketAction::Update => {
            if principal.is_staff() {
                Decision::Allow
            } else if is_owner {
                Decision::AllowFields(TicketFieldMask::CONTENT)
            } else {
                Decision::Deny(DENY_NOT_OWNER)
            }
        }
        TicketAction::Delete => {
            if !can_view {
                Decision::Deny(DENY_NOT_OWNER)
            } else if is_owner || principal.role.is_admin() {
                Decision::Allow
            } else {
                Decision::Deny(DENY_DELETE)
            }
        }
        TicketAction::Assign => {
            if principal.is_staff() {
                Decision::Allow
            } else {
                Decision::Deny(DENY_ASSIGN)
            }
        }
    }
}

/// Creator restriction applied to every ticket listing.
///
/// Returns `Some(user_id)` when the principal may only see tickets they
/// created.
pub fn list_scope(principal: &Principal) -> Option<DbId> {
    if principal.is_staff() {
        None
    } else {
        Some(principal.user_id)
    }
}

/// Internal comments can only be authored by staff; anything else is public.
pub fn effective_internal_flag(principal: &Principal, requested: bool) -> bool {
    requested && principal.is_staff()
}

pub fn can_view_internal_comments(principal: &Principal) -> bool {
    principal.is_staff()
}

/// Whether a user with this role may be assigned tickets.
pub fn is_assignable_role(role: Role) -> bool {
    role.is_staff()
}

pub fn can_view_inactive_categories(principal: &Principal) -> bool {
    principal.role.is_admin()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const OWNER: DbId = 10;
    const OTHER: DbId = 20;

    fn ticket() -> TicketOwnership {
        TicketOwnership { created_by: OWNER }
    }

    fn user(id: DbId) -> Principal {
        Principal::new(id, Role::User)
    }

    fn agent() -> Principal {
        Principal::new(OTHER, Role::Agent)
    }

    fn admin() -> Principal {
        Principal::new(OTHER, Role::Admin)
    }

    // -- view / comment / vote -----------------------------------------------

    #[test]
    fn owner_can_view_comment_and_vote() {
        for action in [TicketAction::View, TicketAction::Comment, TicketAction::Vote] {
            assert_eq!(authorize(&user(OWNER), action, &ticket()), Decision::Allow);
        }
    }

    #[test]
    fn other_user_is_denied_everything() {
        for action in [
            TicketAction::View,
            TicketAction::Comment,
            TicketAction::Vote,
            TicketAction::Update,
            TicketAction::Delete,
            TicketAction::Assign,
        ] {
            assert!(!authorize(&user(OTHER), action, &ticket()).is_allowed());
        }
    }

    #[test]
    fn staff_can_view_any_ticket() {
        assert_eq!(authorize(&agent(), TicketAction::View, &ticket()), Decision::Allow);
        assert_eq!(authorize(&admin(), TicketAction::Vote, &ticket()), Decision::Allow);
    }

    // -- update --------------------------------------------------------------

    #[test]
    fn owner_update_is_limited_to_content() {
        let decision = authorize(&user(OWNER), TicketAction::Update, &ticket());
        assert_eq!(decision, Decision::AllowFields(TicketFieldMask::CONTENT));
        let mask = decision.into_mask().unwrap();
        assert!(mask.subject && mask.description);
        assert!(!mask.status && !mask.priority && !mask.assigned_to);
    }

    #[test]
    fn staff_update_gets_every_field() {
        let mask = authorize(&agent(), TicketAction::Update, &ticket()).into_mask().unwrap();
        assert_eq!(mask, TicketFieldMask::ALL);
    }

    // -- delete --------------------------------------------------------------

    #[test]
    fn owner_and_admin_can_delete() {
        assert_eq!(authorize(&user(OWNER), TicketAction::Delete, &ticket()), Decision::Allow);
        assert_eq!(authorize(&admin(), TicketAction::Delete, &ticket()), Decision::Allow);
    }

    #[test]
    fn agent_who_is_not_creator_cannot_delete() {
        assert_eq!(
            authorize(&agent(), TicketAction::Delete, &ticket()),
            Decision::Deny(DENY_DELETE)
        );
        let creator_agent = Principal::new(OWNER, Role::Agent);
        assert_eq!(authorize(&creator_agent, TicketAction::Delete, &ticket()), Decision::Allow);
    }

    // -- assign --------------------------------------------------------------

    #[test]
    fn only_staff_can_assign() {
        assert_eq!(authorize(&agent(), TicketAction::Assign, &ticket()), Decision::Allow);
        assert_matches!(
            authorize(&user(OWNER), TicketAction::Assign, &ticket()).require(),
            Err(CoreError::Forbidden(_))
        );
    }

    // -- supporting predicates -----------------------------------------------

    #[test]
    fn list_scope_restricts_users_only() {
        assert_eq!(list_scope(&user(OWNER)), Some(OWNER));
        assert_eq!(list_scope(&agent()), None);
        assert_eq!(list_scope(&admin()), None);
    }

    #[test]
    fn user_comments_are_never_internal() {
        assert!(!effective_internal_flag(&user(OWNER), true));
        assert!(effective_internal_flag(&agent(), true));
        assert!(!effective_internal_flag(&admin(), false));
    }

    #[test]
    fn assignable_roles() {
        assert!(!is_assignable_role(Role::User));
        assert!(is_assignable_role(Role::Agent));
        assert!(is_assignable_role(Role::Admin));
    }

    #[test]
    fn inactive_categories_visible_to_admin_only() {
        assert!(can_view_inactive_categories(&admin()));
        assert!(!can_view_inactive_categories(&agent()));
        assert!(!can_view_internal_comments(&user(OWNER)));
        assert!(can_view_internal_comments(&agent()));
    }
}
