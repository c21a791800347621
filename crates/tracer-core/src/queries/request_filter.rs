use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::errors::{Result, TracerError};
use crate::model::DataRequest;

/// Largest page size a caller may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Sort order for request listings
///
/// Only these keys are accepted, unlike a raw `ORDER BY` string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    NameAsc,
    Status,
}

impl SortKey {
    fn compare(&self, a: &DataRequest, b: &DataRequest) -> Ordering {
        // id breaks ties so listings are deterministic
        let primary = match self {
            SortKey::CreatedAtDesc => b.created_at.cmp(&a.created_at),
            SortKey::CreatedAtAsc => a.created_at.cmp(&b.created_at),
            SortKey::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Status => a
                .status
                .cmp(&b.status)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl FromStr for SortKey {
    type Err = TracerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "created_at_desc" | "newest" => Ok(SortKey::CreatedAtDesc),
            "created_at_asc" | "oldest" => Ok(SortKey::CreatedAtAsc),
            "name" | "name_asc" => Ok(SortKey::NameAsc),
            "status" => Ok(SortKey::Status),
            other => Err(TracerError::InvalidFilter {
                reason: format!("unknown sort key '{}'", other),
            }),
        }
    }
}

/// Search, sort and paging parameters for request listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Case-insensitive substring over name, nim and email
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    /// 1-based page; paging applies only when both page and limit are set
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RequestFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, limit: usize) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// Check paging bounds
    ///
    /// # Errors
    /// `InvalidFilter` when `page` is 0 or `limit` is outside 1..=100.
    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(TracerError::InvalidFilter {
                reason: "page must be at least 1".to_string(),
            });
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(TracerError::InvalidFilter {
                    reason: format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
                });
            }
        }
        Ok(())
    }

    pub fn matches(&self, request: &DataRequest) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty())
        else {
            return true;
        };
        let term = term.to_lowercase();
        [&request.name, &request.nim, &request.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Filter, sort and page a list of requests
    ///
    /// # Errors
    /// `InvalidFilter` from [`RequestFilter::validate`].
    pub fn apply(&self, requests: Vec<DataRequest>) -> Result<Vec<DataRequest>> {
        self.validate()?;

        let mut matching: Vec<DataRequest> =
            requests.into_iter().filter(|r| self.matches(r)).collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));

        if let (Some(page), Some(limit)) = (self.page, self.limit) {
            let offset = (page - 1).saturating_mul(limit);
            matching = matching.into_iter().skip(offset).take(limit).collect();
        }

        Ok(matching)
    }
}
