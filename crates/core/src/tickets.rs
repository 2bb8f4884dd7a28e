//! Ticket validation, patch semantics, listing order and pagination.

use crate::access::TicketFieldMask;
use crate::status::{TicketPriority, TicketStatus};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a ticket subject in characters.
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// Maximum length of a ticket description in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Default number of tickets per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum number of tickets per page.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > max {
        return Err(format!("{field} exceeds maximum length of {max} characters"));
    }
    Ok(())
}

/// Validate a ticket subject: non-blank and within the length limit.
pub fn validate_subject(subject: &str) -> Result<(), String> {
    validate_text("Subject", subject, MAX_SUBJECT_LENGTH)
}

/// Validate a ticket description: non-blank and within the length limit.
pub fn validate_description(description: &str) -> Result<(), String> {
    validate_text("Description", description, MAX_DESCRIPTION_LENGTH)
}

/// Empty or whitespace-only text in an update means "leave unchanged".
pub fn normalize_text_patch(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Update patch
// ---------------------------------------------------------------------------

/// A validated ticket update. `None` leaves a field unchanged; for
/// `assigned_to`, `Some(None)` clears the assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<Option<DbId>>,
}

impl TicketChanges {
    /// Drop every change the mask does not permit.
    pub fn masked(self, mask: TicketFieldMask) -> Self {
        Self {
            subject: self.subject.filter(|_| mask.subject),
            description: self.description.filter(|_| mask.description),
            status: self.status.filter(|_| mask.status),
            priority: self.priority.filter(|_| mask.priority),
            assigned_to: self.assigned_to.filter(|_| mask.assigned_to),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
    }

    /// Names of the fields this patch changes, for events and logs.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.subject.is_some() {
            fields.push("subject");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.assigned_to.is_some() {
            fields.push("assigned_to");
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketSortKey {
    Id,
    CreatedAt,
    UpdatedAt,
    Subject,
    Description,
    Status,
    Priority,
    CreatedBy,
    AssignedTo,
    Category,
    UpVotes,
    DownVotes,
    ViewCount,
    MostReplied,
}

impl TicketSortKey {
    /// Accepts every stored ticket field by column name, plus the `status`
    /// and `priority` shorthands and the computed `most_replied`.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "id" => Some(Self::Id),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            "subject" => Some(Self::Subject),
            "description" => Some(Self::Description),
            "status" | "status_id" => Some(Self::Status),
            "priority" | "priority_id" => Some(Self::Priority),
            "created_by" => Some(Self::CreatedBy),
            "assigned_to_id" => Some(Self::AssignedTo),
            "category_id" => Some(Self::Category),
            "up_votes" => Some(Self::UpVotes),
            "down_votes" => Some(Self::DownVotes),
            "view_count" => Some(Self::ViewCount),
            "most_replied" => Some(Self::MostReplied),
            _ => None,
        }
    }

    /// Column (or computed alias, for `MostReplied`) to order by.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Subject => "subject",
            Self::Description => "description",
            Self::Status => "status_id",
            Self::Priority => "priority_id",
            Self::CreatedBy => "created_by",
            Self::AssignedTo => "assigned_to_id",
            Self::Category => "category_id",
            Self::UpVotes => "up_votes",
            Self::DownVotes => "down_votes",
            Self::ViewCount => "view_count",
            Self::MostReplied => "reply_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` case-insensitively; anything else is descending.
    pub fn parse_or_desc(order: Option<&str>) -> Self {
        match order {
            Some(o) if o.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketSort {
    pub key: TicketSortKey,
    pub direction: SortDirection,
}

impl Default for TicketSort {
    fn default() -> Self {
        Self {
            key: TicketSortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TicketSort {
    /// Resolve request parameters. An unknown key falls back to
    /// `created_at DESC` regardless of the requested order.
    pub fn resolve(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        match sort_by {
            None => Self {
                direction: SortDirection::parse_or_desc(sort_order),
                ..Self::default()
            },
            Some(key) => match TicketSortKey::parse(key) {
                Some(key) => Self {
                    key,
                    direction: SortDirection::parse_or_desc(sort_order),
                },
                None => Self::default(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A 1-indexed page request with the size already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn resolve(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows (at least 1).
    pub fn total_pages(&self, total: i64) -> i64 {
        ((total + self.page_size - 1) / self.page_size).max(1)
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Build an `ILIKE` substring pattern, escaping `\`, `%` and `_` so the term
/// matches literally. Blank terms yield `None` (no filter).
pub fn like_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- validation ----------------------------------------------------------

    #[test]
    fn blank_subject_rejected() {
        assert!(validate_subject("").is_err());
        assert!(validate_subject("   ").is_err());
        assert!(validate_subject("Printer on fire").is_ok());
    }

    #[test]
    fn subject_length_counts_characters() {
        assert!(validate_subject(&"é".repeat(MAX_SUBJECT_LENGTH)).is_ok());
        let err = validate_subject(&"a".repeat(MAX_SUBJECT_LENGTH + 1)).unwrap_err();
        assert!(err.contains("maximum length"));
    }

    #[test]
    fn description_limit() {
        assert!(validate_description(&"x".repeat(MAX_DESCRIPTION_LENGTH)).is_ok());
        assert!(validate_description(&"x".repeat(MAX_DESCRIPTION_LENGTH + 1)).is_err());
    }

    #[test]
    fn empty_patch_text_is_unchanged() {
        assert_eq!(normalize_text_patch(Some(String::new())), None);
        assert_eq!(normalize_text_patch(Some("  ".into())), None);
        assert_eq!(normalize_text_patch(None), None);
        assert_eq!(normalize_text_patch(Some("new".into())), Some("new".into()));
    }

    // -- masking -------------------------------------------------------------

    #[test]
    fn content_mask_drops_staff_fields() {
        let changes = TicketChanges {
            subject: Some("s".into()),
            description: None,
            status: Some(TicketStatus::Closed),
            priority: Some(TicketPriority::Urgent),
            assigned_to: Some(None),
        };
        let masked = changes.masked(TicketFieldMask::CONTENT);
        assert_eq!(masked.subject.as_deref(), Some("s"));
        assert_eq!(masked.status, None);
        assert_eq!(masked.priority, None);
        assert_eq!(masked.assigned_to, None);
        assert_eq!(masked.changed_fields(), vec!["subject"]);
    }

    #[test]
    fn fully_masked_patch_is_empty() {
        let changes = TicketChanges {
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        assert!(changes.masked(TicketFieldMask::CONTENT).is_empty());
    }

    // -- sorting -------------------------------------------------------------

    #[test]
    fn default_sort_is_newest_first() {
        assert_eq!(TicketSort::resolve(None, None), TicketSort::default());
        assert_eq!(TicketSort::default().key.column(), "created_at");
        assert_eq!(TicketSort::default().direction.as_sql(), "DESC");
    }

    #[test]
    fn unknown_sort_key_falls_back_to_created_at_desc() {
        let sort = TicketSort::resolve(Some("password_hash"), Some("asc"));
        assert_eq!(sort, TicketSort::default());
    }

    #[test]
    fn known_sort_key_with_order() {
        let sort = TicketSort::resolve(Some("most_replied"), Some("ASC"));
        assert_eq!(sort.key, TicketSortKey::MostReplied);
        assert_eq!(sort.direction, SortDirection::Asc);
        let sort = TicketSort::resolve(Some("priority"), Some("sideways"));
        assert_eq!(sort.key.column(), "priority_id");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn every_stored_field_is_sortable() {
        for (key, column) in [
            ("id", "id"),
            ("description", "description"),
            ("created_by", "created_by"),
            ("assigned_to_id", "assigned_to_id"),
            ("category_id", "category_id"),
            ("status_id", "status_id"),
            ("priority_id", "priority_id"),
        ] {
            let sort = TicketSort::resolve(Some(key), Some("asc"));
            assert_eq!(sort.key.column(), column, "sort key {key}");
            assert_eq!(sort.direction, SortDirection::Asc);
        }
    }

    // -- pagination ----------------------------------------------------------

    #[test]
    fn page_defaults() {
        let page = PageRequest::resolve(None, None);
        assert_eq!(page, PageRequest { page: 1, page_size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::resolve(Some(1), Some(1000)).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::resolve(Some(1), Some(0)).page_size, 1);
        assert_eq!(PageRequest::resolve(Some(-3), Some(5)).page, 1);
    }

    #[test]
    fn offset_and_total_pages() {
        let page = PageRequest::resolve(Some(3), Some(20));
        assert_eq!(page.offset(), 40);
        assert_eq!(page.total_pages(0), 1);
        assert_eq!(page.total_pages(41), 3);
    }

    // -- search --------------------------------------------------------------

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\").as_deref(), Some("%50\\%\\_off\\\\%"));
        assert_eq!(like_pattern("printer").as_deref(), Some("%printer%"));
        assert_eq!(like_pattern("   "), None);
    }
}
