//! Category validation (name and color).

/// Color assigned when a category is created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Maximum length of a category description.
pub const MAX_CATEGORY_DESCRIPTION_LENGTH: usize = 1_000;

/// Validate a category name: non-blank, no surrounding whitespace and
/// within the length limit. Names are compared exactly, so they are never
/// rewritten.
pub fn validate_category_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Category name is required".to_string());
    }
    if name.trim() != name {
        return Err("Category name must not start or end with whitespace".to_string());
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(format!(
            "Category name exceeds maximum length of {MAX_CATEGORY_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

pub fn validate_category_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_CATEGORY_DESCRIPTION_LENGTH {
        return Err(format!(
            "Category description exceeds maximum length of {MAX_CATEGORY_DESCRIPTION_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a hex color of the form `#RGB` or `#RRGGBB`.
pub fn validate_category_color(color: &str) -> Result<(), String> {
    let valid = match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid color '{color}'. Must be #RGB or #RRGGBB"))
    }
}
