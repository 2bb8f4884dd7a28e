//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table created by the initial migration. The
//! string label is the `name` column of that table and the serde form used
//! in JSON payloads and JWT claims.

use crate::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($entity:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $val ),+
        }

        impl $name {
            /// Every variant in discriminant order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Return the database status ID.
            pub fn id(self) -> $crate::status::StatusId {
                self as $crate::status::StatusId
            }

            /// Look up a variant by its database ID.
            pub fn from_id(id: $crate::status::StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lookup-table name of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a lookup-table name (exact match).
            pub fn parse(name: &str) -> Option<Self> {
                match name {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for $crate::status::StatusId {
            fn from(value: $name) -> Self {
                value as $crate::status::StatusId
            }
        }

        impl TryFrom<$crate::status::StatusId> for $name {
            type Error = $crate::error::CoreError;

            fn try_from(id: $crate::status::StatusId) -> Result<Self, Self::Error> {
                $name::from_id(id).ok_or_else(|| {
                    $crate::error::CoreError::Validation(format!(
                        "Unknown {} id {id}",
                        $entity
                    ))
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Ticket workflow status.
    TicketStatus ("ticket status") {
        Open = 1 => "open",
        InProgress = 2 => "in_progress",
        Resolved = 3 => "resolved",
        Closed = 4 => "closed",
    }
}

define_status_enum! {
    /// Ticket priority.
    TicketPriority ("ticket priority") {
        Low = 1 => "low",
        Medium = 2 => "medium",
        High = 3 => "high",
        Urgent = 4 => "urgent",
    }
}

define_status_enum! {
    /// Direction of a vote on a ticket.
    VoteType ("vote type") {
        Up = 1 => "up",
        Down = 2 => "down",
    }
}

define_status_enum! {
    /// Visibility lifecycle shared by tickets, comments and categories.
    ///
    /// `Deleted` rows are excluded from every listing and lookup; they stay in
    /// the table for audit.
    Lifecycle ("lifecycle state") {
        Active = 1 => "active",
        Deleted = 2 => "deleted",
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Open
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

/// Resolve an optional priority id from a request, applying the default.
pub fn priority_or_default(id: Option<StatusId>) -> Result<TicketPriority, CoreError> {
    match id {
        Some(id) => TicketPriority::try_from(id),
        None => Ok(TicketPriority::default()),
    }
}
