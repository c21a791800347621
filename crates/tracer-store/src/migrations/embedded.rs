//! Embedded SQL migrations
//!
//! Migrations are embedded at compile time using include_str!

/// Migration metadata
pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations, in application order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_data_requests",
            sql: include_str!("../../migrations/001_data_requests.sql"),
        },
        Migration {
            id: "002_request_transitions",
            sql: include_str!("../../migrations/002_request_transitions.sql"),
        },
        Migration {
            id: "003_query_history",
            sql: include_str!("../../migrations/003_query_history.sql"),
        },
    ]
}
