//! Application configuration loaded from environment variables.
//!
//! - `FLOWSCOPE_API_URL`: explorer backend base URL
//! - `FLOWSCOPE_API_TOKEN`: optional bearer token
//! - `FLOWSCOPE_TIMEOUT_SECS`: per-request timeout in seconds
//! - `FLOWSCOPE_PAGE_SIZE`: transactions per page, 1 to 100
//! - `FLOWSCOPE_LOG_FILE`: where tracing output is written
//!
//! Empty values are treated as unset.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::FlowscopeError;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_LOG_FILE: &str = "flowscope.log";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub log_file: PathBuf,
}

/// Backend client settings.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub page_size: u32,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`FlowscopeError::Config`] if a numeric variable does not parse,
/// the timeout is zero, or the page size is outside `1..=100`.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url =
        non_empty_var("FLOWSCOPE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let token = non_empty_var("FLOWSCOPE_API_TOKEN");

    let timeout_secs: u64 =
        parsed_var("FLOWSCOPE_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(FlowscopeError::Config(
            "FLOWSCOPE_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    let page_size: u32 = parsed_var("FLOWSCOPE_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(FlowscopeError::Config(format!(
            "FLOWSCOPE_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }

    let log_file = non_empty_var("FLOWSCOPE_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    Ok(AppConfig {
        api: ApiConfig {
            base_url,
            token,
            timeout: Duration::from_secs(timeout_secs),
            page_size,
        },
        log_file,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parsed_var<T: FromStr>(name: &str) -> crate::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    non_empty_var(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| FlowscopeError::Config(format!("{name}={raw:?} is invalid: {e}")))
        })
        .transpose()
}
