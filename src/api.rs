//! HTTP client for the explorer backend.
//!
//! Every endpoint returns JSON with amounts in smallest units. Non-success
//! statuses are surfaced as [`FlowscopeError::Api`] carrying the backend's
//! `message` when it sends one; requests exceeding the configured timeout
//! become [`FlowscopeError::Timeout`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::models::{
    AddressDetail, ApiErrorBody, GraphResponse, Page, Transaction, TransactionDetailResponse,
};
use crate::{FlowscopeError, Result};

/// Source of one-hop address graphs.
///
/// The session fetches through this trait so it can run against an
/// in-memory source in tests.
pub trait GraphSource: Send + Sync + 'static {
    fn address_graph(&self, address: &str) -> impl Future<Output = Result<GraphResponse>> + Send;
}

/// Typed client over the explorer REST endpoints.
#[derive(Clone, Debug)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ExplorerClient {
    /// Builds a client with the configured timeout and optional bearer
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`FlowscopeError::Config`] if the token is not a valid header
    /// value or the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FlowscopeError::Config(format!("invalid API token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FlowscopeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One-hop incoming and outgoing flows around `address`.
    pub async fn address_graph(&self, address: &str) -> Result<GraphResponse> {
        self.get(&format!("/explorer/address/{address}/graph"), &[])
            .await
    }

    /// One page of transactions involving `address`. Pages start at 1.
    pub async fn address_transactions(
        &self,
        address: &str,
        page_size: u32,
        page: u32,
    ) -> Result<Page<Transaction>> {
        self.get(
            &format!("/explorer/address/{address}/txs"),
            &[("pageSize", page_size.to_string()), ("page", page.to_string())],
        )
        .await
    }

    /// Balance and totals for `address`.
    pub async fn address_detail(&self, address: &str) -> Result<AddressDetail> {
        self.get(&format!("/explorer/address-detail/{address}"), &[])
            .await
    }

    /// A single processed transaction.
    pub async fn transaction(&self, txid: &str) -> Result<Transaction> {
        let detail: TransactionDetailResponse =
            self.get(&format!("/explorer/tx/{txid}"), &[]).await?;
        Ok(detail.processed_transaction)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(e, path))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e, path))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            return Err(FlowscopeError::Api(format!("{status} on {path}: {message}")));
        }

        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, error: reqwest::Error, path: &str) -> FlowscopeError {
        if error.is_timeout() {
            FlowscopeError::Timeout(format!("{path} after {}s", self.timeout.as_secs()))
        } else {
            FlowscopeError::Http(error)
        }
    }
}

impl GraphSource for ExplorerClient {
    fn address_graph(&self, address: &str) -> impl Future<Output = Result<GraphResponse>> + Send {
        ExplorerClient::address_graph(self, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            token: token.map(str::to_string),
            timeout: Duration::from_secs(5),
            page_size: 20,
        }
    }

    #[test]
    fn trims_trailing_slash() {
        let client = ExplorerClient::new(&config("http://localhost:3000/api/", None)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn rejects_token_with_newline() {
        let err = ExplorerClient::new(&config("http://x", Some("bad\ntoken"))).unwrap_err();
        assert!(matches!(err, FlowscopeError::Config(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error_not_a_panic() {
        let client = ExplorerClient::new(&config("http://127.0.0.1:9", None)).unwrap();
        let err = client.address_graph("A").await.unwrap_err();
        assert!(err.is_transient());
    }
}
