//! Shared render surface of a table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::row::{RowDiff, RowKey, TableRow, identity};
use crate::error::ProviderError;
use crate::query::PageState;

/// Who slices rows into pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// The table holds every row and shows the current page's slice.
    #[default]
    Client,
    /// The rows already are the current page; the total comes from outside.
    External,
}

/// A row ready for display, with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow<R> {
    /// Row identity within the rendered page.
    pub key: RowKey,
    /// The row itself.
    pub row: R,
}

/// Which slot the table shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState<R> {
    /// A query is in flight.
    Loading,
    /// Nothing is loading and there are no rows.
    Empty,
    /// Rows of the current page.
    Rows(Vec<RenderedRow<R>>),
}

impl<R> RenderState<R> {
    /// Returns `true` for the loading slot.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` for the empty slot.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Rendered rows, if the rows slot is shown.
    pub fn rows(&self) -> Option<&[RenderedRow<R>]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ViewInner<R> {
    rows: Vec<R>,
    paging: PagingMode,
    page: PageState,
    loading: bool,
    error: Option<ProviderError>,
}

impl<R: TableRow> ViewInner<R> {
    fn visible(&self) -> &[R] {
        match self.paging {
            PagingMode::External => &self.rows,
            PagingMode::Client => {
                let start = self.page.skip().min(self.rows.len());
                let end = start
                    .saturating_add(self.page.page_size())
                    .min(self.rows.len());
                &self.rows[start..end]
            }
        }
    }

    fn visible_keys(&self) -> Vec<RowKey> {
        self.visible()
            .iter()
            .enumerate()
            .map(|(i, row)| identity(i, row))
            .collect()
    }

    /// Keeps the client-side page within range after the row count changed.
    fn sync_client_total(&mut self) {
        if self.paging == PagingMode::Client {
            self.page.set_total_items(self.rows.len());
            if self.page.page_index() > self.page.page_count() {
                let last = self.page.page_count();
                self.page.set_page_index(last);
            }
        }
    }
}

/// The table's render surface: rows, paging, loading flag and last error.
///
/// `TableView<R>` is a cheap-to-clone handle over shared state. The widget
/// owns one; the orchestrator writes query results into a clone of it.
#[derive(Debug)]
pub struct TableView<R> {
    inner: Arc<RwLock<ViewInner<R>>>,
    dirty: Arc<AtomicBool>,
}

impl<R: TableRow> TableView<R> {
    /// Create an empty client-paged view.
    pub fn new(page_size: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewInner {
                rows: Vec::new(),
                paging: PagingMode::Client,
                page: PageState::new(page_size),
                loading: false,
                error: None,
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Replace every row and report how the rendered keys changed.
    pub fn replace_rows(&self, rows: Vec<R>) -> RowDiff {
        let Ok(mut guard) = self.inner.write() else {
            return RowDiff::default();
        };
        let before = guard.visible_keys();
        guard.rows = rows;
        guard.sync_client_total();
        self.dirty.store(true, Ordering::SeqCst);
        RowDiff::between(&before, &guard.visible_keys())
    }

    /// Publish a query result: rows, page state, loading cleared, error
    /// cleared. All four change under one lock.
    pub fn apply_response(&self, rows: Vec<R>, page: PageState) -> RowDiff {
        let Ok(mut guard) = self.inner.write() else {
            return RowDiff::default();
        };
        let before = guard.visible_keys();
        guard.rows = rows;
        guard.page = page;
        guard.loading = false;
        guard.error = None;
        self.dirty.store(true, Ordering::SeqCst);
        RowDiff::between(&before, &guard.visible_keys())
    }

    /// Every row held, across pages.
    pub fn rows(&self) -> Vec<R> {
        self.inner.read().map(|g| g.rows.clone()).unwrap_or_default()
    }

    /// Rows of the current page with their identities.
    pub fn visible_rows(&self) -> Vec<RenderedRow<R>> {
        self.inner
            .read()
            .map(|g| {
                g.visible()
                    .iter()
                    .enumerate()
                    .map(|(i, row)| RenderedRow {
                        key: identity(i, row),
                        row: row.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Row of the current page at `index`.
    pub fn visible_row(&self, index: usize) -> Option<R> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.visible().get(index).cloned())
    }

    /// Number of rows on the current page.
    pub fn visible_len(&self) -> usize {
        self.inner.read().map(|g| g.visible().len()).unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Paging
    // -------------------------------------------------------------------------

    /// Current paging mode.
    pub fn paging_mode(&self) -> PagingMode {
        self.inner.read().map(|g| g.paging).unwrap_or_default()
    }

    /// Switch paging mode.
    pub fn set_paging_mode(&self, mode: PagingMode) {
        if let Ok(mut guard) = self.inner.write()
            && guard.paging != mode
        {
            guard.paging = mode;
            guard.sync_client_total();
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Current page state.
    pub fn page(&self) -> PageState {
        self.inner.read().map(|g| g.page).unwrap_or_default()
    }

    /// Replace the page state.
    ///
    /// In client mode the total stays the number of rows held.
    pub fn set_page(&self, page: PageState) {
        if let Ok(mut guard) = self.inner.write() {
            guard.page = page;
            guard.sync_client_total();
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Record an externally supplied total. Ignored in client mode.
    pub fn set_total_items(&self, total: usize) {
        if let Ok(mut guard) = self.inner.write()
            && guard.paging == PagingMode::External
        {
            guard.page.set_total_items(total);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Total rows across pages.
    pub fn total_items(&self) -> usize {
        self.page().total_items()
    }

    // -------------------------------------------------------------------------
    // Loading and errors
    // -------------------------------------------------------------------------

    /// Whether a query is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().map(|g| g.loading).unwrap_or(false)
    }

    /// Set the loading flag.
    pub fn set_loading(&self, loading: bool) {
        if let Ok(mut guard) = self.inner.write()
            && guard.loading != loading
        {
            guard.loading = loading;
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Last provider error, kept until the next successful response.
    pub fn error(&self) -> Option<ProviderError> {
        self.inner.read().ok().and_then(|g| g.error.clone())
    }

    /// Record a provider error and clear the loading flag. Rows are kept.
    pub fn fail(&self, error: ProviderError) {
        if let Ok(mut guard) = self.inner.write() {
            guard.loading = false;
            guard.error = Some(error);
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Pick the slot to show. `loading` overrides the view's own flag.
    pub fn render_state(&self, loading: Option<bool>) -> RenderState<R> {
        if loading.unwrap_or_else(|| self.is_loading()) {
            return RenderState::Loading;
        }
        let rows = self.visible_rows();
        if rows.is_empty() {
            RenderState::Empty
        } else {
            RenderState::Rows(rows)
        }
    }

    /// Check if the view has changed since the last check.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Flag the view for re-render without changing its state.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<R> Clone for TableView<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value as Json, json};

    use super::*;
    use crate::table::RowId;

    fn rows(n: i64) -> Vec<Json> {
        (1..=n).map(|id| json!({"id": id})).collect()
    }

    #[test]
    fn test_client_paging_slices_rows() {
        let view = TableView::new(2);
        view.replace_rows(rows(5));
        assert_eq!(view.total_items(), 5);
        assert_eq!(view.visible_len(), 2);

        let mut page = view.page();
        page.set_page_index(3);
        view.set_page(page);
        let visible = view.visible_rows();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].key, RowKey::Id(RowId::Int(5)));
    }

    #[test]
    fn test_client_page_clamped_when_rows_shrink() {
        let view = TableView::new(2);
        view.replace_rows(rows(5));
        let mut page = view.page();
        page.set_page_index(3);
        view.set_page(page);

        view.replace_rows(rows(2));
        assert_eq!(view.page().page_index(), 1);
        assert_eq!(view.visible_len(), 2);
    }

    #[test]
    fn test_external_paging_shows_all_rows() {
        let view = TableView::new(2);
        view.set_paging_mode(PagingMode::External);
        view.replace_rows(rows(3));
        view.set_total_items(40);
        assert_eq!(view.visible_len(), 3);
        assert_eq!(view.total_items(), 40);
    }

    #[test]
    fn test_render_slots() {
        let view = TableView::<Json>::new(5);
        assert!(view.render_state(None).is_empty());

        view.set_loading(true);
        assert!(view.render_state(None).is_loading());

        view.set_loading(false);
        view.replace_rows(rows(2));
        assert_eq!(view.render_state(None).rows().map(<[_]>::len), Some(2));
        assert!(view.render_state(Some(true)).is_loading());
    }

    #[test]
    fn test_fail_keeps_rows() {
        let view = TableView::new(5);
        view.replace_rows(rows(2));
        view.set_loading(true);
        view.fail(ProviderError::backend("down"));

        assert!(!view.is_loading());
        assert_eq!(view.visible_len(), 2);
        assert_eq!(view.error(), Some(ProviderError::backend("down")));
    }

    #[test]
    fn test_replace_reports_diff() {
        let view = TableView::new(5);
        view.replace_rows(rows(2));
        let diff = view.replace_rows(rows(3));
        assert_eq!(diff.inserted, vec![RowKey::Id(RowId::Int(3))]);
        assert_eq!(diff.retained.len(), 2);
        assert!(view.is_dirty());
        view.clear_dirty();
        assert!(!view.is_dirty());
    }
}
