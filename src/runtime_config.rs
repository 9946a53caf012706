//! # Runtime Configuration Module
//!
//! Environment-driven settings for the routing engine. The host loads this
//! once at startup and hands it to [`Server::with_config`](crate::Server::with_config).
//!
//! ## Environment Variables
//!
//! ### `XPRESS_HOME_URL`
//!
//! The site's canonical base URL, e.g. `https://example.com/blog`. The
//! default URL generator builds absolute URLs from it and the permalink
//! builder uses its path as the known-good prefix when a URL filter rewrites
//! generated links.
//!
//! Default: `http://localhost`
//!
//! ### `XPRESS_DEBUG_ERRORS`
//!
//! When `1`, `true` or `yes`, handler failures expose the underlying error
//! message in the 500 body. Otherwise a generic message is returned.
//!
//! Default: off
//!
//! ### `XPRESS_LOG_LEVEL` / `XPRESS_LOG_FORMAT`
//!
//! Fallback filter (when `RUST_LOG` is unset) and output format (`pretty` or
//! `json`) for [`logging::init_logging`](crate::logging::init_logging).
//!
//! Defaults: `info`, `pretty`

use std::env;

use tracing::warn;
use url::Url;

use crate::logging::{LogFormat, LoggingConfig};

pub const DEFAULT_HOME_URL: &str = "http://localhost";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Canonical site base URL
    pub home_url: Url,
    /// Include handler error details in 500 responses
    pub debug_errors: bool,
    /// Logging setup
    pub logging: LoggingConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            debug_errors: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` is the
    /// production entry point; tests pass a closure over a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let home_url = match lookup("XPRESS_HOME_URL") {
            Some(raw) => match Url::parse(raw.trim()) {
                Ok(url) if url.has_host() => url,
                Ok(_) | Err(_) => {
                    warn!(value = %raw, "XPRESS_HOME_URL is not an absolute URL, using default");
                    default_home_url()
                }
            },
            None => default_home_url(),
        };

        let debug_errors = lookup("XPRESS_DEBUG_ERRORS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let mut logging = LoggingConfig::default();
        if let Some(level) = lookup("XPRESS_LOG_LEVEL") {
            logging.level = level.trim().to_lowercase();
        }
        if let Some(format) = lookup("XPRESS_LOG_FORMAT") {
            logging.format = LogFormat::parse(&format);
        }

        RuntimeConfig {
            home_url,
            debug_errors,
            logging,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_home_url() -> Url {
    Url::parse(DEFAULT_HOME_URL).expect("default home URL is a valid literal")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
