use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use metrics::histogram;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::feed::filter::FeedFilter;
use crate::model::PostSummary;

/// Failures of a single page request. None of these reach the view layer;
/// the pagination driver logs them and clears its in-flight flag.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("feed endpoint answered HTTP {status}")]
    Status { status: u16 },
    #[error("feed page is not a list of posts: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Remote source of feed pages. `page` is 1-based; an empty page means the
/// filter has no further data.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(&self, filter: &FeedFilter, page: u32)
        -> Result<Vec<PostSummary>, FeedError>;
    fn name(&self) -> &'static str;
}

/// Feed pages from the PHP posts endpoint.
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn from_config(cfg: &ApiConfig, client: reqwest::Client) -> Self {
        Self::new(client, cfg.endpoint(&cfg.posts_endpoint))
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_page(
        &self,
        filter: &FeedFilter,
        page: u32,
    ) -> Result<Vec<PostSummary>, FeedError> {
        let t0 = std::time::Instant::now();
        let page_str = page.to_string();
        let mut query = filter.query_pairs();
        query.push(("page", page_str.as_str()));

        let resp = self.client.get(&self.url).query(&query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text().await?;
        histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        parse_page(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Decode a page body. Blank, `null` and non-array bodies (the backend
/// answers `{"message": ...}` past the last page on some routes) all mean
/// "no more data".
pub fn parse_page(body: &str) -> Result<Vec<PostSummary>, FeedError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    if !value.is_array() {
        tracing::debug!(target: "feed", "non-array feed page treated as end of data");
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

/// In-memory pages keyed by filter. Pages past the end come back empty.
#[derive(Default)]
pub struct FixtureFeedSource {
    pages: HashMap<FeedFilter, Vec<Vec<PostSummary>>>,
    calls: Arc<AtomicUsize>,
}

impl FixtureFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, filter: FeedFilter, pages: Vec<Vec<PostSummary>>) -> Self {
        self.pages.insert(filter, pages);
        self
    }

    /// Number of `fetch_page` calls served so far.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch_page(
        &self,
        filter: &FeedFilter,
        page: u32,
    ) -> Result<Vec<PostSummary>, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let idx = page.saturating_sub(1) as usize;
        Ok(self
            .pages
            .get(filter)
            .and_then(|pages| pages.get(idx))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
