//! Shared test utilities and constants.

use std::time::Duration;

use flowscope::api::ExplorerClient;
use flowscope::config::ApiConfig;

/// Backend used by live tests, overridable with `FLOWSCOPE_API_URL`.
pub const DEFAULT_TEST_API_URL: &str = "http://localhost:3000/api";

/// Address the live tests explore, overridable with `FLOWSCOPE_TEST_ADDRESS`.
pub const DEFAULT_TEST_ADDRESS: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";

pub fn test_address() -> String {
    std::env::var("FLOWSCOPE_TEST_ADDRESS").unwrap_or_else(|_| DEFAULT_TEST_ADDRESS.to_string())
}

/// Builds a client against the live test backend.
pub fn test_client() -> ExplorerClient {
    let config = ApiConfig {
        base_url: std::env::var("FLOWSCOPE_API_URL")
            .unwrap_or_else(|_| DEFAULT_TEST_API_URL.to_string()),
        token: std::env::var("FLOWSCOPE_API_TOKEN").ok(),
        timeout: Duration::from_secs(30),
        page_size: 20,
    };
    ExplorerClient::new(&config).expect("failed to build explorer client")
}
