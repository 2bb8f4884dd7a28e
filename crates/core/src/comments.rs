//! Comment validation.

/// Maximum length of comment content in characters.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Validate comment content: must be non-blank and within the length limit.
pub fn validate_comment_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Comment content cannot be empty".to_string());
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(format!(
            "Comment content exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_comment_rejected() {
        assert!(validate_comment_content("").is_err());
        assert!(validate_comment_content("\n  ").is_err());
    }

    #[test]
    fn length_limit() {
        assert!(validate_comment_content(&"c".repeat(MAX_COMMENT_LENGTH)).is_ok());
        let err = validate_comment_content(&"c".repeat(MAX_COMMENT_LENGTH + 1)).unwrap_err();
        assert!(err.contains("maximum length"));
    }
}
