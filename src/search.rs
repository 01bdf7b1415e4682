//! Debounced search input: only the latest query reaches the backend, and
//! only the latest query's results are shown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::model::SearchHit;
use crate::services::{BlogApi, ServiceError};

#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError>;
}

#[async_trait]
impl Searcher for BlogApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ServiceError> {
        BlogApi::search(self, query).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results for the query that is still current.
    Results(Vec<SearchHit>),
    /// A newer keystroke arrived; nothing to show for this one.
    Superseded,
}

#[derive(Clone)]
pub struct SearchBox {
    debounce: Duration,
    latest: Arc<AtomicU64>,
}

impl SearchBox {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Feed one keystroke's worth of input. Waits out the debounce window,
    /// then searches unless a newer input came in meanwhile. Failed
    /// searches show as no results.
    pub async fn input(&self, query: &str, searcher: &dyn Searcher) -> SearchOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            return SearchOutcome::Superseded;
        }

        let q = query.trim();
        let hits = if q.is_empty() {
            Vec::new()
        } else {
            searcher.search(q).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "search failed");
                Vec::new()
            })
        };

        if self.latest.load(Ordering::SeqCst) != ticket {
            return SearchOutcome::Superseded;
        }
        SearchOutcome::Results(hits)
    }
}
