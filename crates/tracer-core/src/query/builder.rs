use serde::{Deserialize, Serialize};

use crate::errors::{Result, TracerError};

/// Query assembled from explicit clauses against one fixed table
///
/// Clause fragments are taken verbatim; run the rendered text through
/// [`super::guard::ensure_select_only`] before executing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleQuery {
    pub select: Vec<String>,
    #[serde(default, rename = "where")]
    pub where_clauses: Vec<String>,
    #[serde(default)]
    pub order_by: Vec<String>,
    /// 0 means no limit
    #[serde(default)]
    pub limit: u32,
}

impl SimpleQuery {
    pub fn new<I, S>(select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            select: select.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.where_clauses.push(clause.into());
        self
    }

    pub fn order(mut self, clause: impl Into<String>) -> Self {
        self.order_by.push(clause.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Render against `table`
    ///
    /// # Errors
    ///
    /// `MalformedRequest` when the table name is blank or nothing is selected.
    pub fn render(&self, table: &str) -> Result<String> {
        let table = table.trim();
        if table.is_empty() {
            return Err(TracerError::MalformedRequest {
                reason: "fixed table name is empty".to_string(),
            });
        }

        let select: Vec<&str> = non_blank(&self.select);
        if select.is_empty() {
            return Err(TracerError::MalformedRequest {
                reason: "select list is empty".to_string(),
            });
        }

        let mut query = format!("SELECT {} FROM {}", select.join(", "), table);

        let where_clauses = non_blank(&self.where_clauses);
        if !where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&where_clauses.join(" AND "));
        }

        let order_by = non_blank(&self.order_by);
        if !order_by.is_empty() {
            query.push_str(" ORDER BY ");
            query.push_str(&order_by.join(", "));
        }

        if self.limit > 0 {
            query.push_str(&format!(" LIMIT {}", self.limit));
        }

        Ok(query)
    }
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}
