pub mod accumulator;
pub mod driver;
pub mod filter;
pub mod source;
pub mod trigger;

pub use accumulator::FeedAccumulator;
pub use driver::{FeedController, FeedHandle, FeedPhase, FeedSnapshot, PageOutcome, PageTicket};
pub use filter::FeedFilter;
pub use source::{FeedError, FeedSource, FixtureFeedSource, HttpFeedSource};
pub use trigger::{LoadMoreButton, MoreRequested, ScrollTrigger};

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feed_pages_fetched_total",
            "Non-empty feed pages applied."
        );
        describe_counter!(
            "feed_items_appended_total",
            "Posts appended to feeds."
        );
        describe_counter!("feed_fetch_errors_total", "Feed page fetch failures.");
        describe_counter!(
            "feed_stale_responses_total",
            "Pages dropped because the filter changed mid-flight."
        );
        describe_counter!("feed_exhausted_total", "Feeds that reached their last page.");
        describe_histogram!("feed_fetch_ms", "Feed page fetch time in milliseconds.");
    });
}
