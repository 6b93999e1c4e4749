//! Side-channel fragment fetches
//!
//! Rendered markup (graph, charts, disambiguation modals) is produced
//! server-side and fetched over plain HTTP, outside the socket. The core
//! consumes these endpoints only as "given a key, returns a markup blob".

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::{ChainwatchError, Result};

/// HTTP collaborator the dispatcher fetches rendered fragments through
#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Fetch a rendered graph fragment by file name
    async fn fetch_graph(&self, file_name: &str) -> Result<String>;
    /// Fetch the chart markup for the current analysis
    async fn fetch_charts(&self) -> Result<String>;
    /// Submit manual-transaction selections; returns the modal markup
    async fn submit_manual_selection(&self, payload: &Value) -> Result<String>;
}

/// reqwest-backed implementation against the analysis backend
pub struct HttpFetcher {
    http: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    /// Create a fetcher for the given base URL
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| ChainwatchError::InvalidConfig(format!("bad endpoint {}: {}", path, e)))
    }

    async fn read_body(&self, response: reqwest::Response, what: &str) -> Result<String> {
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChainwatchError::FragmentNotAvailable(what.to_string()));
        }
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl FragmentFetcher for HttpFetcher {
    async fn fetch_graph(&self, file_name: &str) -> Result<String> {
        let url = self.endpoint("display_graph/")?;
        let response = self
            .http
            .get(url)
            .query(&[("file_name", file_name)])
            .send()
            .await?;
        self.read_body(response, file_name).await
    }

    async fn fetch_charts(&self) -> Result<String> {
        let url = self.endpoint("display_charts/")?;
        let response = self.http.get(url).send().await?;
        self.read_body(response, "charts").await
    }

    async fn submit_manual_selection(&self, payload: &Value) -> Result<String> {
        let url = self.endpoint("display_manual_transactions/")?;
        let response = self.http.post(url).json(payload).send().await?;
        self.read_body(response, "manual transactions").await
    }
}
