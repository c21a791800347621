use crate::errors::{Result, TracerError};

/// Reject anything that is not a single read-only statement
///
/// The statement must start with `SELECT` or `WITH` (any case, after
/// leading whitespace). A `;` is accepted only as the final non-whitespace
/// character, so generated templates pass while stacked statements do not.
///
/// # Errors
///
/// `UnsafeQuery` describing the first violation found.
pub fn ensure_select_only(sql: &str) -> Result<()> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(unsafe_query("query is empty"));
    }

    let keyword: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    if keyword != "SELECT" && keyword != "WITH" {
        return Err(unsafe_query("only SELECT statements are allowed"));
    }

    let body = trimmed.strip_suffix(';').unwrap_or(trimmed);
    if body.contains(';') {
        return Err(unsafe_query("multiple statements are not allowed"));
    }

    Ok(())
}

fn unsafe_query(reason: &str) -> TracerError {
    TracerError::UnsafeQuery {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_select_and_with() {
        assert!(ensure_select_only("SELECT * FROM graduates").is_ok());
        assert!(ensure_select_only("  select name from graduates").is_ok());
        assert!(ensure_select_only("WITH g AS (SELECT 1) SELECT * FROM g").is_ok());
    }

    #[test]
    fn test_accepts_single_trailing_terminator() {
        assert!(ensure_select_only("SELECT *\nFROM graduates;\n").is_ok());
    }

    #[test]
    fn test_rejects_writes() {
        assert!(ensure_select_only("DELETE FROM graduates").is_err());
        assert!(ensure_select_only("UPDATE graduates SET name = 'x'").is_err());
        assert!(ensure_select_only("SELECTED").is_err());
    }

    #[test]
    fn test_rejects_stacked_statements() {
        let err = ensure_select_only("SELECT 1; DROP TABLE graduates;").unwrap_err();
        assert!(matches!(err, TracerError::UnsafeQuery { .. }));
    }

    #[test]
    fn test_rejects_placeholder_comment() {
        assert!(ensure_select_only(super::super::template::PLACEHOLDER).is_err());
    }
}
