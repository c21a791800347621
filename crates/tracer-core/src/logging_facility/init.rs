//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset, per profile
const DEV_FILTER: &str = "tracer=debug";
const PROD_FILTER: &str = "tracer=info";

/// Output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, debug level
    Development,
    /// One JSON object per event, info level
    Production,
    /// Events go to the capture layer installed by `init_test_capture`
    Test,
}

impl Profile {
    /// Pick a profile from the `TRACER_LOG` setting
    ///
    /// `json` selects `Production`; anything else, or nothing, selects
    /// `Development`.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => Profile::Production,
            _ => Profile::Development,
        }
    }

    fn default_filter(&self) -> &'static str {
        match self {
            Profile::Production => PROD_FILTER,
            _ => DEV_FILTER,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter. Output goes to stderr so command output on stdout stays
/// machine-readable.
///
/// ```
/// use tracer_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));

        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .finish()
                    .try_init()
                    .ok();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .finish()
                    .try_init()
                    .ok();
            }
            Profile::Test => {
                tracing_subscriber::registry().try_init().ok();
            }
        }
    });
}
