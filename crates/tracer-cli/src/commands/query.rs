//! Query commands
//!
//! Usage: tracer query <preview|check|build|history>

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Subcommand};
use tracer_core::query::SimpleQuery;
use tracer_engine::commands::query as engine;
use tracer_store::db;

use super::print_json;
use crate::config::Config;

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub command: QueryCommand,
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Print the SQL for a request (stored query, else generated template)
    Preview {
        /// Request ID
        id: String,
        /// Check the query and add it to the history
        #[arg(long)]
        record: bool,
    },
    /// Check that a statement is a single read-only query
    Check {
        sql: String,
    },
    /// Render a query from explicit clauses against one table
    Build(BuildArgs),
    /// List recorded queries
    History {
        /// Inclusive lower bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[arg(long)]
    pub table: String,

    /// Comma-separated column list
    #[arg(long)]
    pub select: String,

    /// Condition, repeatable; joined with AND
    #[arg(long = "where")]
    pub where_clauses: Vec<String>,

    /// Ordering term, repeatable
    #[arg(long)]
    pub order_by: Vec<String>,

    #[arg(long, default_value_t = 0)]
    pub limit: u32,
}

/// Execute query command
pub fn execute(args: QueryArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        QueryCommand::Preview { id, record } => {
            let conn = db::open_store(&config.db_path)?;
            println!("{}", engine::query_preview(&conn, &id, record)?);
            Ok(())
        }
        QueryCommand::Check { sql } => {
            engine::query_check(&sql)?;
            println!("OK");
            Ok(())
        }
        QueryCommand::Build(build) => {
            let query = SimpleQuery {
                select: tracer_core::model::parse_list(&build.select),
                where_clauses: build.where_clauses,
                order_by: build.order_by,
                limit: build.limit,
            };
            println!("{}", engine::query_build(&query, &build.table)?);
            Ok(())
        }
        QueryCommand::History { from, to } => {
            let from = from.as_deref().map(|s| parse_bound(s, false)).transpose()?;
            let to = to.as_deref().map(|s| parse_bound(s, true)).transpose()?;
            let conn = db::open_store(&config.db_path)?;
            print_json(&engine::query_history(&conn, from, to)?)
        }
    }
}

/// Parse a history bound; a bare date covers the whole day
fn parse_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected RFC 3339 or YYYY-MM-DD", raw))?;
    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| "invalid time of day".to_string())?;

    Ok(date.and_time(time).and_utc())
}
