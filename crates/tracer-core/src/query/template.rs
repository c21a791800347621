//! Query template generation
//!
//! Derives a human-readable SQL preview from a request's tables, columns,
//! year range and purpose. The join and filter choices are keyword
//! heuristics; the output is for preview and must pass
//! [`super::guard::ensure_select_only`] before execution.

use crate::errors::{Result, TracerError};
use crate::model::DataRequest;

/// Returned instead of a query when the request cannot produce one
pub const PLACEHOLDER: &str = "-- SQL query will be generated based on requested tables and columns";

const TECH_MAJORS: &str =
    "major IN ('Computer Science', 'Information Technology', 'Software Engineering')";
const ORDER_CLAUSE: &str = "ORDER BY graduation_year DESC, name ASC";

/// Generate the preview query, falling back to [`PLACEHOLDER`]
///
/// Pure: the same request always yields the same bytes.
pub fn generate(request: &DataRequest) -> String {
    try_generate(request).unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// Generate the preview query
///
/// # Errors
///
/// `MalformedRequest` when no table is requested or `year_from > year_to`.
pub fn try_generate(request: &DataRequest) -> Result<String> {
    let main = request
        .main_table()
        .ok_or_else(|| TracerError::MalformedRequest {
            reason: "no table requested".to_string(),
        })?;

    if let Some((from, to)) = request.year_range() {
        if from > to {
            return Err(TracerError::MalformedRequest {
                reason: format!("year_from {} is after year_to {}", from, to),
            });
        }
    }

    let mut lines = Vec::with_capacity(request.tables.len() + 4);

    if request.selects_all_columns() {
        lines.push("SELECT *".to_string());
    } else {
        let columns: Vec<&str> = request
            .columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        lines.push(format!("SELECT {}", columns.join(", ")));
    }

    lines.push(format!("FROM {}", main));

    for table in &request.tables[1..] {
        lines.push(format!("LEFT JOIN {} ON {}", table, join_condition(main, table)));
    }

    let conditions = conditions(request);
    if let Some((first, rest)) = conditions.split_first() {
        lines.push(format!("WHERE {}", first));
        lines.extend(rest.iter().map(|c| format!("  AND {}", c)));
    }

    lines.push(ORDER_CLAUSE.to_string());

    Ok(format!("{};", lines.join("\n")))
}

/// The stored admin query when present, else the generated preview
pub fn effective_query(request: &DataRequest) -> String {
    match request.sql_query.as_deref().map(str::trim) {
        Some(sql) if !sql.is_empty() => sql.to_string(),
        _ => generate(request),
    }
}

/// Join condition for a secondary table, picked by name keywords
///
/// The company branch always references `employment`, whatever the main
/// table is.
fn join_condition(main: &str, table: &str) -> String {
    if table.contains("employment") || table.contains("job") {
        format!("{}.id = {}.graduate_id", main, table)
    } else if table.contains("company") || table.contains("companies") {
        format!("employment.company_id = {}.id", table)
    } else if table.contains("salary") || table.contains("demographic") {
        format!("{}.id = {}.graduate_id", main, table)
    } else {
        format!("{}.id = {}.{}_id", main, table, main)
    }
}

fn conditions(request: &DataRequest) -> Vec<String> {
    let mut conditions = Vec::new();

    if let Some((from, to)) = request.year_range() {
        conditions.push(format!("graduation_year BETWEEN {} AND {}", from, to));
    }

    let purpose = request.purpose.to_lowercase();
    if purpose.contains("computer science") || purpose.contains("tech") {
        conditions.push(TECH_MAJORS.to_string());
    }
    if purpose.contains("salary") || purpose.contains("gender") {
        conditions.push("salary_range IS NOT NULL".to_string());
    }

    conditions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_condition_priority() {
        // "job_salary" matches the employment/job branch before salary
        assert_eq!(
            join_condition("graduates", "job_salary"),
            "graduates.id = job_salary.graduate_id"
        );
        assert_eq!(
            join_condition("alumni", "company_profiles"),
            "employment.company_id = company_profiles.id"
        );
        assert_eq!(
            join_condition("graduates", "demographics"),
            "graduates.id = demographics.graduate_id"
        );
        assert_eq!(
            join_condition("graduates", "surveys"),
            "graduates.id = surveys.graduates_id"
        );
    }

    #[test]
    fn test_join_keywords_are_case_sensitive() {
        assert_eq!(
            join_condition("graduates", "Employment"),
            "graduates.id = Employment.graduates_id"
        );
    }
}
