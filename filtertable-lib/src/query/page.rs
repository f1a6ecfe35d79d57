//! Paging state.

use serde::Deserialize;
use serde::Serialize;

/// Paginator output: the page the user navigated to.
///
/// `page_index` is 0-based, as reported by the paging control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEvent {
    /// 0-based page index.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl PageEvent {
    /// Creates a new page event.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

/// Logical paging state.
///
/// `page_index` is 1-based and never below 1. `total_items` is whatever the
/// last successful query reported. Deserialized states are clamped the same
/// way as [`set_page_index`](Self::set_page_index) and
/// [`set_page_size`](Self::set_page_size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPageState")]
pub struct PageState {
    page_index: usize,
    page_size: usize,
    total_items: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageState {
    page_index: usize,
    page_size: usize,
    #[serde(default)]
    total_items: usize,
}

impl From<RawPageState> for PageState {
    fn from(raw: RawPageState) -> Self {
        let mut page = PageState::new(raw.page_size);
        page.set_page_index(raw.page_index);
        page.set_total_items(raw.total_items);
        page
    }
}

impl PageState {
    /// First page of `page_size` rows, no items known yet.
    ///
    /// A zero page size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    /// 1-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total rows matching the current filter.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of rows to skip for the current page. Saturates at
    /// `usize::MAX` for pages far past the end.
    pub fn skip(&self) -> usize {
        self.page_index
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total_items`; at least 1.
    pub fn page_count(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// Returns `true` if a page follows the current one.
    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count()
    }

    /// Returns `true` if the 0-based `page_index` lies within the known
    /// total. Any page is accepted while the total is unknown (zero).
    pub fn contains(&self, page_index: usize) -> bool {
        self.total_items == 0 || page_index < self.page_count()
    }

    /// Returns `true` if a page precedes the current one.
    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    /// Moves to the 1-based `page_index`, clamped to at least 1.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    /// Changes the page size, clamped to at least 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// Records the total reported by the provider.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
    }

    /// Back to the first page.
    pub fn reset(&mut self) {
        self.page_index = 1;
    }

    /// Applies a paginator event, converting its 0-based index.
    pub fn apply(&mut self, event: PageEvent) {
        self.set_page_size(event.page_size);
        self.set_page_index(event.page_index.saturating_add(1));
    }

    /// The paginator event describing this state.
    pub fn to_event(&self) -> PageEvent {
        PageEvent::new(self.page_index.saturating_sub(1), self.page_size)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_is_zero_on_first_page() {
        let mut page = PageState::new(10);
        assert_eq!(page.skip(), 0);
        page.apply(PageEvent::new(2, 10));
        assert_eq!(page.page_index(), 3);
        assert_eq!(page.skip(), 20);
        page.reset();
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_page_count() {
        let mut page = PageState::new(5);
        assert_eq!(page.page_count(), 1);
        page.set_total_items(11);
        assert_eq!(page.page_count(), 3);
        assert!(page.has_next());
        page.set_page_index(3);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_index_never_below_one() {
        let mut page = PageState::new(0);
        page.set_page_index(0);
        assert_eq!(page.page_index(), 1);
        assert_eq!(page.page_size(), 1);
        assert_eq!(page.to_event(), PageEvent::new(0, 1));
    }

    #[test]
    fn test_far_page_saturates() {
        let mut page = PageState::new(5);
        page.apply(PageEvent::new(usize::MAX / 2, 5));
        assert_eq!(page.skip(), usize::MAX);

        page.apply(PageEvent::new(usize::MAX, 5));
        assert_eq!(page.page_index(), usize::MAX);
        assert_eq!(page.to_event(), PageEvent::new(usize::MAX - 1, 5));
    }

    #[test]
    fn test_contains_respects_known_total() {
        let mut page = PageState::new(5);
        assert!(page.contains(1_000));
        page.set_total_items(12);
        assert!(page.contains(2));
        assert!(!page.contains(3));
    }

    #[test]
    fn test_deserialize_clamps_to_first_page() {
        let page: PageState =
            serde_json::from_str(r#"{"pageIndex":0,"pageSize":0,"totalItems":4}"#).unwrap();
        assert_eq!(page.page_index(), 1);
        assert_eq!(page.page_size(), 1);
        assert_eq!(page.skip(), 0);
        assert_eq!(page.total_items(), 4);
    }
}
