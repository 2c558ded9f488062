//! Application configuration.
//!
//! Compile-time defaults, overridable from the environment (a `.env` file is
//! honored) and then from CLI flags.

use std::env;
use std::str::FromStr;

/// Spaces per indentation level in the JSON output.
pub const DEFAULT_INDENT: usize = 4;

/// Widest accepted indentation level.
pub const MAX_INDENT: usize = 16;

/// HTTP port for `csvjson serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum request body for conversion endpoints (in bytes).
///
/// 50 MB limit.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Data rows shown by `preview`.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Capacity of the log broadcast channel.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

pub const ENV_PORT: &str = "CSVJSON_PORT";
pub const ENV_MAX_UPLOAD_BYTES: &str = "CSVJSON_MAX_UPLOAD_BYTES";
pub const ENV_INDENT: &str = "CSVJSON_INDENT";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            indent: DEFAULT_INDENT,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, after reading `.env` if present.
    ///
    /// Unset or unparsable variables keep their default, as does an indent
    /// above [`MAX_INDENT`].
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let indent = parse_or(lookup(ENV_INDENT), defaults.indent);
        Self {
            port: parse_or(lookup(ENV_PORT), defaults.port),
            max_upload_bytes: parse_or(lookup(ENV_MAX_UPLOAD_BYTES), defaults.max_upload_bytes),
            indent: if indent > MAX_INDENT { defaults.indent } else { indent },
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
