//! "Load more" triggers. Whatever the concrete source (scroll position,
//! visibility, an explicit button), it boils down to one [`MoreRequested`]
//! signal handed to the pagination driver.

use crate::feed::driver::{FeedHandle, PageOutcome};
use crate::feed::source::FeedSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoreRequested;

/// Fires once each time the reader scrolls past `threshold` (fraction of
/// content height, 0.8 by default). Re-arms when the content grows (the next
/// page rendered) or when the reader scrolls back above the threshold, so a
/// failed page can be retried by scrolling down again.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold: f64,
    armed: bool,
    last_content_height: f64,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl ScrollTrigger {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            armed: true,
            last_content_height: 0.0,
        }
    }

    pub fn on_scroll(
        &mut self,
        scroll_top: f64,
        viewport_height: f64,
        content_height: f64,
    ) -> Option<MoreRequested> {
        if content_height > self.last_content_height {
            self.armed = true;
        }
        self.last_content_height = content_height;
        if content_height <= 0.0 {
            return None;
        }
        let seen = (scroll_top + viewport_height) / content_height;
        if seen < self.threshold {
            self.armed = true;
            return None;
        }
        if self.armed {
            self.armed = false;
            return Some(MoreRequested);
        }
        None
    }

    /// Forget the previous feed's geometry. Call on filter change.
    pub fn reset(&mut self) {
        self.armed = true;
        self.last_content_height = 0.0;
    }
}

/// Explicit "load more" button.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadMoreButton;

impl LoadMoreButton {
    pub fn press(&self) -> MoreRequested {
        MoreRequested
    }
}

/// Route a signal to the driver. Duplicate signals while a page is out are
/// absorbed by the driver's in-flight guard.
pub async fn on_more_requested(
    _signal: MoreRequested,
    feed: &FeedHandle,
    source: &dyn FeedSource,
) -> PageOutcome {
    feed.request_next_page(source).await
}
