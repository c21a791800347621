#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use tracer_core::model::{
    parse_column_list, parse_list, DataRequest, NewDataRequest, OutputFormat, RequestStatus,
};

/// Fixed instant so timestamps in assertions are predictable
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// A valid creation draft
pub fn sample_draft() -> NewDataRequest {
    NewDataRequest {
        name: "Budi Santoso".to_string(),
        nim: "13520001".to_string(),
        email: "budi@students.itb.ac.id".to_string(),
        phone_number: "08123456789".to_string(),
        purpose: "Thesis research".to_string(),
        format: OutputFormat::Csv,
        year_from: Some(2020),
        year_to: Some(2024),
        tables: vec!["graduates".to_string()],
        columns: vec![],
        sql_query: None,
    }
}

/// A request built directly from a draft, bypassing validation
pub fn request_with(
    id: &str,
    tables: &str,
    columns: &str,
    years: (Option<i32>, Option<i32>),
    purpose: &str,
) -> DataRequest {
    let mut draft = sample_draft();
    draft.tables = parse_list(tables);
    draft.columns = parse_column_list(columns);
    draft.year_from = years.0;
    draft.year_to = years.1;
    draft.purpose = purpose.to_string();
    DataRequest::from_draft(id.to_string(), draft, t0())
}

/// A request forced into `status`
pub fn request_in(status: RequestStatus) -> DataRequest {
    let mut req = DataRequest::from_draft("dr-test".to_string(), sample_draft(), t0());
    req.status = status;
    req
}
