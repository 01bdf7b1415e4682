use crate::feed::filter::FeedFilter;
use crate::model::PostSummary;

/// Posts loaded so far for one filter, in server ranking order.
///
/// Items are append-only between resets. Ids are assumed unique per filter
/// (the backend never re-emits a post it already served for that filter);
/// nothing here reorders or deduplicates.
#[derive(Debug, Clone)]
pub struct FeedAccumulator {
    filter: FeedFilter,
    items: Vec<PostSummary>,
    next_page: u32,
    exhausted: bool,
}

impl FeedAccumulator {
    pub fn new(filter: FeedFilter) -> Self {
        Self {
            filter,
            items: Vec::new(),
            next_page: 1,
            exhausted: false,
        }
    }

    /// Switch to `filter` and drop everything derived from the previous one.
    pub fn reset(&mut self, filter: FeedFilter) {
        self.filter = filter;
        self.items.clear();
        self.next_page = 1;
        self.exhausted = false;
    }

    /// Append a non-empty page and advance the page cursor.
    /// Empty pages go through [`mark_exhausted`](Self::mark_exhausted) instead.
    pub fn append(&mut self, page: Vec<PostSummary>) {
        debug_assert!(!page.is_empty(), "empty pages mark exhaustion");
        self.items.extend(page);
        self.next_page += 1;
    }

    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn items(&self) -> &[PostSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
