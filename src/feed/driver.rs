//! Pagination driver: owns one filter context's feed state and decides when
//! a page request may go out and whether its answer may be applied.
//!
//! A request is split in two halves so the network call can happen without
//! holding the state: [`FeedController::begin_request`] hands out a
//! [`PageTicket`], [`FeedController::complete`] applies the result if the
//! ticket still belongs to the current filter context.

use std::sync::{Arc, Mutex, MutexGuard};

use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::feed::accumulator::FeedAccumulator;
use crate::feed::ensure_metrics_described;
use crate::feed::filter::FeedFilter;
use crate::feed::source::{FeedError, FeedSource};
use crate::model::PostSummary;

/// Visible state of a feed. `Empty` and `Exhausted` both end pagination;
/// `Empty` means nothing was ever loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    Loading,
    Populated,
    LoadingMore,
    Empty,
    Exhausted,
}

/// What a page request did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page had items; this many were appended.
    Appended(usize),
    /// Page was empty; the feed is now exhausted.
    Exhausted,
    /// Filter changed while the request was out; result dropped.
    Stale,
    /// Request failed; state untouched apart from the in-flight flag.
    Failed,
    /// Not sent: a request was already in flight or the feed is exhausted.
    Skipped,
}

/// Captured at dispatch time; identifies which filter context a response
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    filter: FeedFilter,
    generation: u64,
    page: u32,
}

impl PageTicket {
    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

#[derive(Debug, Clone)]
pub struct FeedController {
    acc: FeedAccumulator,
    in_flight: bool,
    // bumped on every filter change so A -> B -> A still rejects A's old answers
    generation: u64,
}

impl FeedController {
    pub fn new(filter: FeedFilter) -> Self {
        ensure_metrics_described();
        Self {
            acc: FeedAccumulator::new(filter),
            in_flight: false,
            generation: 0,
        }
    }

    /// Switch filter context. Returns false when `filter` is already active.
    /// A request still out for the old filter becomes stale and no longer
    /// blocks the new one.
    pub fn set_filter(&mut self, filter: FeedFilter) -> bool {
        if &filter == self.acc.filter() {
            return false;
        }
        self.acc.reset(filter);
        self.generation += 1;
        self.in_flight = false;
        true
    }

    /// Reserve the next page. `None` while a request is in flight or once
    /// the feed is exhausted.
    pub fn begin_request(&mut self) -> Option<PageTicket> {
        if self.in_flight || self.acc.is_exhausted() {
            return None;
        }
        self.in_flight = true;
        Some(PageTicket {
            filter: self.acc.filter().clone(),
            generation: self.generation,
            page: self.acc.next_page(),
        })
    }

    /// Apply the answer for `ticket`.
    pub fn complete(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<PostSummary>, FeedError>,
    ) -> PageOutcome {
        if ticket.generation != self.generation || &ticket.filter != self.acc.filter() {
            debug!(
                target: "feed",
                filter = %ticket.filter,
                page = ticket.page,
                "dropping stale page"
            );
            counter!("feed_stale_responses_total").increment(1);
            return PageOutcome::Stale;
        }
        self.in_flight = false;

        match result {
            Ok(page) if page.is_empty() => {
                self.acc.mark_exhausted();
                counter!("feed_exhausted_total").increment(1);
                PageOutcome::Exhausted
            }
            Ok(page) => {
                let n = page.len();
                self.acc.append(page);
                counter!("feed_pages_fetched_total").increment(1);
                counter!("feed_items_appended_total").increment(n as u64);
                PageOutcome::Appended(n)
            }
            Err(e) => {
                warn!(
                    target: "feed",
                    error = %e,
                    filter = %ticket.filter,
                    page = ticket.page,
                    "feed page fetch failed"
                );
                counter!("feed_fetch_errors_total").increment(1);
                PageOutcome::Failed
            }
        }
    }

    /// Fetch and apply the next page in one go.
    pub async fn request_next_page(&mut self, source: &dyn FeedSource) -> PageOutcome {
        let Some(ticket) = self.begin_request() else {
            return PageOutcome::Skipped;
        };
        let result = source.fetch_page(&ticket.filter, ticket.page).await;
        self.complete(ticket, result)
    }

    pub fn phase(&self) -> FeedPhase {
        match (self.acc.is_empty(), self.acc.is_exhausted(), self.in_flight) {
            (true, true, _) => FeedPhase::Empty,
            (false, true, _) => FeedPhase::Exhausted,
            (false, false, true) => FeedPhase::LoadingMore,
            (false, false, false) => FeedPhase::Populated,
            (true, false, _) => FeedPhase::Loading,
        }
    }

    pub fn filter(&self) -> &FeedFilter {
        self.acc.filter()
    }

    pub fn items(&self) -> &[PostSummary] {
        self.acc.items()
    }

    pub fn next_page(&self) -> u32 {
        self.acc.next_page()
    }

    pub fn is_exhausted(&self) -> bool {
        self.acc.is_exhausted()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            filter: self.filter().clone(),
            phase: self.phase(),
            items: self.items().to_vec(),
            next_page: self.next_page(),
            exhausted: self.is_exhausted(),
            fetch_in_flight: self.in_flight,
        }
    }
}

/// Read-only copy of a feed for the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSnapshot {
    pub filter: FeedFilter,
    pub phase: FeedPhase,
    pub items: Vec<PostSummary>,
    pub next_page: u32,
    pub exhausted: bool,
    pub fetch_in_flight: bool,
}

/// Shared handle for driving one feed from several triggers at once
/// (scroll, button, filter navigation). The lock is never held across the
/// network call.
#[derive(Clone)]
pub struct FeedHandle {
    inner: Arc<Mutex<FeedController>>,
}

impl FeedHandle {
    pub fn new(filter: FeedFilter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeedController::new(filter))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedController> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    pub fn set_filter(&self, filter: FeedFilter) -> bool {
        self.lock().set_filter(filter)
    }

    pub async fn request_next_page(&self, source: &dyn FeedSource) -> PageOutcome {
        let ticket = self.lock().begin_request();
        let Some(ticket) = ticket else {
            return PageOutcome::Skipped;
        };
        let result = source.fetch_page(&ticket.filter, ticket.page).await;
        self.lock().complete(ticket, result)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.lock().snapshot()
    }

    pub fn phase(&self) -> FeedPhase {
        self.lock().phase()
    }
}
