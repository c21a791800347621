//! Runtime configuration from the environment
//!
//! Precedence: command-line flag, then environment (including `.env`), then
//! the built-in default.

use std::path::PathBuf;

use tracer_core::logging_facility::Profile;

pub const ENV_DB: &str = "TRACER_DB";
pub const ENV_LOG: &str = "TRACER_LOG";
pub const ENV_BASE_URL: &str = "TRACER_BASE_URL";

pub const DEFAULT_DB: &str = ".tracer/store.db";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_profile: Profile,
    /// Base of the download links in ready mails
    pub base_url: String,
}

impl Config {
    pub fn from_env(db_override: Option<PathBuf>) -> Self {
        Self::from_lookup(db_override, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(db_override: Option<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = db_override
            .or_else(|| non_blank(ENV_DB).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB));

        Self {
            db_path,
            log_profile: Profile::from_setting(non_blank(ENV_LOG).as_deref()),
            base_url: non_blank(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}
