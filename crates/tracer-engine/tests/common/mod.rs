#![allow(dead_code)]

use rusqlite::Connection;
use tracer_core::model::{parse_list, NewDataRequest, OutputFormat};

pub fn setup() -> Connection {
    tracer_store::db::open_store_in_memory().expect("in-memory store")
}

pub fn draft(tables: &str, purpose: &str) -> NewDataRequest {
    NewDataRequest {
        name: "Sari Dewi".to_string(),
        nim: "13519002".to_string(),
        email: "sari@students.itb.ac.id".to_string(),
        phone_number: "0812000000".to_string(),
        purpose: purpose.to_string(),
        format: OutputFormat::Csv,
        year_from: Some(2020),
        year_to: Some(2024),
        tables: parse_list(tables),
        columns: parse_list("name, nim"),
        sql_query: None,
    }
}
