use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracer_core_types::Sensitive;

use super::format::OutputFormat;
use super::status::RequestStatus;

/// A student's request for an extract of tracer-study data
///
/// The backend is the system of record; values of this type are in-memory
/// copies. Requester fields never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRequest {
    /// Opaque identifier (UUID v7 when created locally)
    pub id: String,

    // Requester
    pub name: String,
    /// Student identifier (Nomor Induk Mahasiswa)
    pub nim: String,
    pub email: String,
    pub phone_number: String,

    /// Free-text research purpose
    #[serde(alias = "pourpose")]
    pub purpose: String,

    pub format: OutputFormat,

    #[serde(default, with = "wire::zero_as_none")]
    pub year_from: Option<i32>,

    #[serde(default, with = "wire::zero_as_none")]
    pub year_to: Option<i32>,

    /// Requested tables; the first one is the main table
    #[serde(rename = "table", default, with = "wire::comma_list")]
    pub tables: Vec<String>,

    /// Requested columns; empty, or a blank first entry, means every column
    #[serde(default, with = "wire::column_list")]
    pub columns: Vec<String>,

    /// Query text stored by an administrator, overriding the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,

    #[serde(default)]
    pub status: RequestStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl DataRequest {
    /// Build a `Pending` request from a draft without validating it
    ///
    /// Use `ops::request_ops::create_request` for the checked path.
    pub fn from_draft(id: String, draft: NewDataRequest, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id,
            name: draft.name,
            nim: draft.nim,
            email: draft.email,
            phone_number: draft.phone_number,
            purpose: draft.purpose,
            format: draft.format,
            year_from: draft.year_from,
            year_to: draft.year_to,
            tables: draft.tables,
            columns: draft.columns,
            sql_query: draft.sql_query,
            status: RequestStatus::Pending,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// First requested table, if any
    pub fn main_table(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }

    /// Both ends of the year range, when the request carries one
    pub fn year_range(&self) -> Option<(i32, i32)> {
        match (self.year_from, self.year_to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }

    /// Requester email wrapped for logging
    pub fn email_for_log(&self) -> Sensitive<&str> {
        Sensitive::new(self.email.as_str())
    }

    /// `SELECT *` applies: no columns, or the first one is blank
    pub fn selects_all_columns(&self) -> bool {
        self.columns.first().map_or(true, |c| c.trim().is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Creation draft submitted by a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataRequest {
    pub name: String,
    pub nim: String,
    pub email: String,
    pub phone_number: String,
    #[serde(alias = "pourpose")]
    pub purpose: String,
    pub format: OutputFormat,
    #[serde(default, with = "wire::zero_as_none")]
    pub year_from: Option<i32>,
    #[serde(default, with = "wire::zero_as_none")]
    pub year_to: Option<i32>,
    #[serde(rename = "table", default, with = "wire::comma_list")]
    pub tables: Vec<String>,
    #[serde(default, with = "wire::column_list")]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
}

/// Split a comma-separated list, trimming items and dropping empty ones
///
/// ```
/// use tracer_core::model::parse_list;
///
/// assert_eq!(parse_list("graduates, employment ,"), vec!["graduates", "employment"]);
/// assert!(parse_list("  ").is_empty());
/// ```
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a column list like [`parse_list`], keeping a blank first entry
///
/// A blank first entry selects every column, so it survives parsing as `""`
/// when other columns follow it.
///
/// ```
/// use tracer_core::model::parse_column_list;
///
/// assert_eq!(parse_column_list(", name"), vec!["", "name"]);
/// assert_eq!(parse_column_list("name,, nim"), vec!["name", "nim"]);
/// assert!(parse_column_list(" ").is_empty());
/// ```
pub fn parse_column_list(raw: &str) -> Vec<String> {
    let mut columns = parse_list(raw);
    let leading_blank = raw
        .split(',')
        .next()
        .map_or(false, |first| first.trim().is_empty());
    if leading_blank && !columns.is_empty() {
        columns.insert(0, String::new());
    }
    columns
}

/// Current time at the precision the store keeps
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Serde adapters for the backend's JSON shape
mod wire {
    pub mod comma_list {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(items: &[String], s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&items.join(", "))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            Ok(raw.as_deref().map(super::super::parse_list).unwrap_or_default())
        }
    }

    pub mod column_list {
        use serde::{Deserialize, Deserializer};

        pub use super::comma_list::serialize;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            Ok(raw
                .as_deref()
                .map(super::super::parse_column_list)
                .unwrap_or_default())
        }
    }

    /// The backend stores an unset year as 0
    pub mod zero_as_none {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(year: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
            match year {
                Some(y) => s.serialize_i32(*y),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
            let raw: Option<i32> = Option::deserialize(d)?;
            Ok(raw.filter(|y| *y != 0))
        }
    }
}
