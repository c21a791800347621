//! Request commands
//!
//! Usage: tracer request <create|list|show|amend|transition|history|set-query|ready-mail>

use clap::{Args, Subcommand};
use tracer_core::model::{parse_column_list, parse_list, NewDataRequest, OutputFormat, RequestStatus};
use tracer_core::ops::RequestAmendment;
use tracer_core::queries::{RequestFilter, SortKey};
use tracer_core_types::OperationContext;
use tracer_engine::commands::request as engine;
use tracer_store::db;

use super::print_json;
use crate::config::Config;

#[derive(Debug, Args)]
pub struct RequestArgs {
    #[command(subcommand)]
    pub command: RequestCommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// Submit a new data request
    Create(CreateArgs),
    /// List requests
    List(ListArgs),
    /// Show one request
    Show {
        /// Request ID
        id: String,
    },
    /// Change a request's attributes while it awaits review
    Amend(AmendArgs),
    /// Change a request's status
    Transition(TransitionArgs),
    /// Show a request's status history
    History {
        /// Request ID
        id: String,
    },
    /// Store an administrator's query on a request
    SetQuery {
        /// Request ID
        id: String,
        /// SELECT statement
        sql: String,
    },
    /// Draft the "data is ready" mail for a completed request
    ReadyMail {
        /// Request ID
        id: String,
        /// Identifier of the exported CSV
        #[arg(long)]
        csv_id: String,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    /// Student number (NIM)
    #[arg(long)]
    pub nim: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Research purpose
    #[arg(long)]
    pub purpose: String,

    /// CSV, Excel or JSON
    #[arg(long)]
    pub format: String,

    #[arg(long)]
    pub year_from: Option<i32>,

    #[arg(long)]
    pub year_to: Option<i32>,

    /// Comma-separated tables; the first is the main table
    #[arg(long, default_value = "")]
    pub table: String,

    /// Comma-separated columns (default: all)
    #[arg(long, default_value = "")]
    pub columns: String,

    /// Query text supplied with the request
    #[arg(long)]
    pub sql_query: Option<String>,
}

#[derive(Debug, Args)]
pub struct AmendArgs {
    /// Request ID
    pub id: String,

    #[arg(long)]
    pub purpose: Option<String>,

    /// CSV, Excel or JSON
    #[arg(long)]
    pub format: Option<String>,

    /// 0 clears the bound
    #[arg(long)]
    pub year_from: Option<i32>,

    /// 0 clears the bound
    #[arg(long)]
    pub year_to: Option<i32>,

    /// Comma-separated tables; the first is the main table
    #[arg(long)]
    pub table: Option<String>,

    /// Comma-separated columns; empty selects all
    #[arg(long)]
    pub columns: Option<String>,

    /// Query text; empty clears the stored query
    #[arg(long)]
    pub sql_query: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Substring of name, NIM or email
    #[arg(long)]
    pub search: Option<String>,

    /// newest, oldest, name or status
    #[arg(long, default_value = "newest")]
    pub sort: String,

    #[arg(long, requires = "limit")]
    pub page: Option<usize>,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct TransitionArgs {
    /// Request ID
    pub id: String,

    /// Target status, e.g. APPROVED or in-progress
    pub status: String,

    /// Admin notes to store with the change
    #[arg(long)]
    pub notes: Option<String>,

    /// Administrator applying the change
    #[arg(long)]
    pub actor: Option<String>,
}

/// Execute request command
pub fn execute(args: RequestArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        RequestCommand::Create(create) => execute_create(create, config),
        RequestCommand::List(list) => execute_list(list, config),
        RequestCommand::Show { id } => {
            let conn = db::open_store(&config.db_path)?;
            print_json(&engine::request_get(&conn, &id)?)
        }
        RequestCommand::Amend(amend) => execute_amend(amend, config),
        RequestCommand::Transition(t) => execute_transition(t, config),
        RequestCommand::History { id } => {
            let conn = db::open_store(&config.db_path)?;
            print_json(&engine::request_history(&conn, &id)?)
        }
        RequestCommand::SetQuery { id, sql } => {
            let conn = db::open_store(&config.db_path)?;
            let updated =
                engine::request_attach_query(&conn, &OperationContext::new(), &id, &sql)?;
            print_json(&updated)
        }
        RequestCommand::ReadyMail { id, csv_id } => {
            let conn = db::open_store(&config.db_path)?;
            print_json(&engine::request_ready_mail(
                &conn,
                &id,
                &config.base_url,
                &csv_id,
            )?)
        }
    }
}

fn execute_create(args: CreateArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let draft = NewDataRequest {
        name: args.name,
        nim: args.nim,
        email: args.email,
        phone_number: args.phone,
        purpose: args.purpose,
        format: args.format.parse::<OutputFormat>()?,
        year_from: args.year_from,
        year_to: args.year_to,
        tables: parse_list(&args.table),
        columns: parse_column_list(&args.columns),
        sql_query: args.sql_query,
    };

    let conn = db::open_store(&config.db_path)?;
    print_json(&engine::request_create(&conn, draft)?)
}

fn execute_list(args: ListArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut filter = RequestFilter::default().sort(args.sort.parse::<SortKey>()?);
    if let Some(search) = args.search {
        filter = filter.search(search);
    }
    filter.page = args.page.or(args.limit.map(|_| 1));
    filter.limit = args.limit;

    let conn = db::open_store(&config.db_path)?;
    print_json(&engine::request_list(&conn, &filter)?)
}

fn execute_amend(args: AmendArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // the backend's convention: year 0 means unset
    let year = |y: i32| if y == 0 { None } else { Some(y) };

    let amendment = RequestAmendment {
        purpose: args.purpose,
        format: args.format.map(|f| f.parse::<OutputFormat>()).transpose()?,
        year_from: args.year_from.map(year),
        year_to: args.year_to.map(year),
        tables: args.table.as_deref().map(parse_list),
        columns: args.columns.as_deref().map(parse_column_list),
        sql_query: args.sql_query,
    };

    let conn = db::open_store(&config.db_path)?;
    print_json(&engine::request_amend(
        &conn,
        &OperationContext::new(),
        &args.id,
        &amendment,
    )?)
}

fn execute_transition(
    args: TransitionArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = args.status.parse::<RequestStatus>()?;
    let mut ctx = OperationContext::new();
    if let Some(actor) = args.actor {
        ctx = ctx.with_actor(actor);
    }

    let mut conn = db::open_store(&config.db_path)?;
    let result =
        engine::request_transition(&mut conn, &ctx, &args.id, target, args.notes.as_deref())?;
    print_json(&result)
}
