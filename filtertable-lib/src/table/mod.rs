//! Filterable table widget.
//!
//! [`TableWidget`] combines a [`FilterForm`] with a paged row view. It owns
//! the widget-side state (columns, paginator, data source binding) and
//! exposes three outputs:
//!
//! - `filter_changed` - every filter form emission, forwarded as is
//! - `page_changed` - paginator navigation, advisory only
//! - `row_activated` - user interaction with a row, passed through
//!
//! Rows are drawn from a [`TableView`], a shared render surface that a
//! consumer such as the query orchestrator writes into.

mod config;
mod row;
mod source;
mod view;

pub use config::DEFAULT_PAGE_SIZE_OPTIONS;
pub use config::TableConfig;
pub use row::RowDiff;
pub use row::RowId;
pub use row::RowKey;
pub use row::TableRow;
pub use row::identity;
pub use source::DataSource;
pub use view::PagingMode;
pub use view::RenderState;
pub use view::RenderedRow;
pub use view::TableView;

use source::StreamTask;

use crate::error::{FormError, PagingError, SchemaError};
use crate::events::{EventEmitter, Subscription};
use crate::form::FilterForm;
use crate::model::{FieldDescriptor, FilterValue, PartialFilter, Value};
use crate::query::{PageEvent, PageState};

/// A data table with an embedded filter form and paginator.
///
/// # Example
///
/// ```
/// use filtertable_lib::model::{FieldDescriptor, PartialFilter};
/// use filtertable_lib::table::{DataSource, TableConfig, TableWidget};
/// use serde_json::json;
///
/// let mut table = TableWidget::new(["name", "currency"], TableConfig::default());
/// table.set_filter_fields(vec![FieldDescriptor::text("name", "Name")])?;
/// table.set_data_source(DataSource::Static(vec![
///     json!({"id": 1, "name": "Acme", "currency": "USD"}),
/// ]));
///
/// let _sub = table.on_filter_changed(|value| println!("{:?}", value.get("name")));
/// table.edit_filter("name", "Ac")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TableWidget<R: TableRow> {
    columns: Vec<String>,
    aria_label: String,
    page_size_options: Vec<usize>,

    form: FilterForm,
    filter_fields: Vec<FieldDescriptor>,
    filter_initial: PartialFilter,
    /// Forwards form emissions to `filter_changed`; replaced on every
    /// re-initialization.
    filter_binding: Option<Subscription>,

    view: TableView<R>,
    external_paging: bool,
    is_stream_source: bool,
    stream_task: Option<StreamTask>,
    loading_override: Option<bool>,

    filter_changed: EventEmitter<FilterValue>,
    page_changed: EventEmitter<PageEvent>,
    row_activated: EventEmitter<R>,
}

impl<R: TableRow> TableWidget<R> {
    /// Create a table with the given columns and no filter fields.
    pub fn new<C: Into<String>>(columns: impl IntoIterator<Item = C>, config: TableConfig) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            aria_label: config.aria_label,
            page_size_options: config.page_size_options,
            form: FilterForm::new(),
            filter_fields: Vec::new(),
            filter_initial: PartialFilter::new(),
            filter_binding: None,
            view: TableView::new(config.page_size),
            external_paging: false,
            is_stream_source: false,
            stream_task: None,
            loading_override: None,
            filter_changed: EventEmitter::new(),
            page_changed: EventEmitter::new(),
            row_activated: EventEmitter::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Columns and labels
    // -------------------------------------------------------------------------

    /// Displayed column identifiers, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Replace the displayed columns.
    pub fn set_columns<C: Into<String>>(&mut self, columns: impl IntoIterator<Item = C>) {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.view.mark_dirty();
    }

    /// Accessible name of the table region.
    pub fn aria_label(&self) -> &str {
        &self.aria_label
    }

    /// Set the accessible name.
    pub fn set_aria_label(&mut self, label: impl Into<String>) {
        self.aria_label = label.into();
    }

    // -------------------------------------------------------------------------
    // Filter form
    // -------------------------------------------------------------------------

    /// Apply a new filter schema and re-initialize the form.
    ///
    /// Emits the resolved value on `filter_changed`. On error the form is
    /// left uninitialized and [`reset_filter`](Self::reset_filter) fails.
    pub fn set_filter_fields(
        &mut self,
        fields: Vec<FieldDescriptor>,
    ) -> Result<FilterValue, SchemaError> {
        self.filter_fields = fields;
        self.init_filter_form()
    }

    /// Apply new initial filter values and re-initialize the form.
    pub fn set_initial_filter_value(
        &mut self,
        initial: PartialFilter,
    ) -> Result<FilterValue, SchemaError> {
        self.filter_initial = initial;
        self.init_filter_form()
    }

    fn init_filter_form(&mut self) -> Result<FilterValue, SchemaError> {
        // The old binding must be gone before the new one exists.
        drop(self.filter_binding.take());
        let forward = self.filter_changed.clone();
        self.filter_binding = Some(self.form.subscribe(move |value| forward.emit(value)));
        self.form
            .initialize(self.filter_fields.iter().cloned(), &self.filter_initial)
    }

    /// Current filter value, if the form is initialized.
    pub fn filter_value(&self) -> Option<&FilterValue> {
        self.form.value()
    }

    /// The embedded filter form.
    pub fn filter_form(&self) -> &FilterForm {
        &self.form
    }

    /// Apply a user edit to one filter field.
    pub fn edit_filter(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<FilterValue, FormError> {
        self.form.edit(name, value)
    }

    /// Reset every filter field to its schema default.
    pub fn reset_filter(&mut self) -> Result<FilterValue, FormError> {
        self.form.reset()
    }

    // -------------------------------------------------------------------------
    // Data source
    // -------------------------------------------------------------------------

    /// Replace the data source and rebuild the view from it.
    ///
    /// A stream source is forwarded by a task on the current tokio runtime;
    /// replacing the source aborts that task.
    pub fn set_data_source(&mut self, source: DataSource<R>) {
        self.stream_task = None;
        match source {
            DataSource::Static(rows) => {
                self.is_stream_source = false;
                self.view.set_paging_mode(self.paging_mode());
                let count = rows.len();
                let diff = self.view.replace_rows(rows);
                log::debug!(
                    "Static source applied: {} rows, {} inserted, {} removed",
                    count,
                    diff.inserted.len(),
                    diff.removed.len()
                );
            }
            DataSource::Stream(stream) => {
                self.is_stream_source = true;
                self.view.set_paging_mode(PagingMode::External);
                self.stream_task = Some(StreamTask::spawn(stream, self.view.clone()));
            }
        }
    }

    /// Declare whether a consumer pages the data.
    ///
    /// With external paging a static source is shown as is; without it the
    /// table pages through a static source itself. Stream sources are always
    /// externally paged.
    pub fn set_external_paging(&mut self, external: bool) {
        self.external_paging = external;
        self.view.set_paging_mode(self.paging_mode());
    }

    /// Paging mode currently in effect.
    pub fn paging_mode(&self) -> PagingMode {
        if self.external_paging || self.is_stream_source {
            PagingMode::External
        } else {
            PagingMode::Client
        }
    }

    /// Handle to the render surface.
    pub fn view(&self) -> TableView<R> {
        self.view.clone()
    }

    // -------------------------------------------------------------------------
    // Loading and rendering
    // -------------------------------------------------------------------------

    /// Force the loading slot on or off; `None` follows the view.
    pub fn set_loading_override(&mut self, loading: Option<bool>) {
        self.loading_override = loading;
    }

    /// Whether the loading slot is shown.
    pub fn is_loading(&self) -> bool {
        self.loading_override
            .unwrap_or_else(|| self.view.is_loading())
    }

    /// The slot to show and its rows.
    pub fn render(&self) -> RenderState<R> {
        self.view.render_state(self.loading_override)
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Emit `row_activated` for `row`.
    pub fn activate_row(&self, row: &R) {
        self.row_activated.emit(row);
    }

    /// Emit `row_activated` for the visible row at `index`.
    pub fn activate_row_at(&self, index: usize) -> Option<R> {
        let row = self.view.visible_row(index)?;
        self.row_activated.emit(&row);
        Some(row)
    }

    // -------------------------------------------------------------------------
    // Paginator
    // -------------------------------------------------------------------------

    /// Page sizes offered by the paginator.
    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Current page state.
    pub fn page(&self) -> PageState {
        self.view.page()
    }

    /// Handle a paginator event: update the paginator and emit
    /// `page_changed`. The table does not fetch anything itself.
    ///
    /// Once a total is known, pages past the last one are rejected.
    pub fn change_page(&mut self, event: PageEvent) -> Result<(), PagingError> {
        if event.page_size == 0 {
            return Err(PagingError::ZeroPageSize);
        }
        let mut page = self.view.page();
        page.set_page_size(event.page_size);
        if !page.contains(event.page_index) {
            return Err(PagingError::OutOfRange {
                page_index: event.page_index,
                page_count: page.page_count(),
            });
        }
        page.apply(event);
        self.view.set_page(page);
        log::trace!(
            "Page changed to index {} (size {})",
            event.page_index,
            event.page_size
        );
        self.page_changed.emit(&event);
        Ok(())
    }

    /// Request a page programmatically; same as a paginator event.
    pub fn load_page(&mut self, page_index: usize, page_size: usize) -> Result<(), PagingError> {
        self.change_page(PageEvent::new(page_index, page_size))
    }

    /// Change the page size, keeping the first visible row on screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PagingError> {
        if page_size == 0 {
            return Err(PagingError::ZeroPageSize);
        }
        let page = self.view.page();
        let first_row = page.skip();
        self.change_page(PageEvent::new(first_row / page_size, page_size))
    }

    /// Number of pages for the current total.
    pub fn page_count(&self) -> usize {
        self.view.page().page_count()
    }

    pub fn has_next_page(&self) -> bool {
        self.view.page().has_next()
    }

    pub fn has_previous_page(&self) -> bool {
        self.view.page().has_previous()
    }

    /// Go to the next page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        let page = self.view.page();
        page.has_next() && self.move_to(page.page_index(), page.page_size())
    }

    /// Go to the previous page. Returns `false` on the first page.
    pub fn previous_page(&mut self) -> bool {
        let page = self.view.page();
        page.has_previous() && self.move_to(page.page_index() - 2, page.page_size())
    }

    /// Go to the first page. Returns `false` if already there.
    pub fn first_page(&mut self) -> bool {
        let page = self.view.page();
        page.has_previous() && self.move_to(0, page.page_size())
    }

    /// Go to the last page. Returns `false` if already there.
    pub fn last_page(&mut self) -> bool {
        let page = self.view.page();
        page.has_next() && self.move_to(page.page_count() - 1, page.page_size())
    }

    fn move_to(&mut self, page_index: usize, page_size: usize) -> bool {
        self.change_page(PageEvent::new(page_index, page_size)).is_ok()
    }

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------

    /// Listen to filter changes.
    pub fn on_filter_changed(
        &self,
        listener: impl FnMut(&FilterValue) + Send + 'static,
    ) -> Subscription {
        self.filter_changed.subscribe(listener)
    }

    /// Listen to paginator navigation.
    pub fn on_page_changed(
        &self,
        listener: impl FnMut(&PageEvent) + Send + 'static,
    ) -> Subscription {
        self.page_changed.subscribe(listener)
    }

    /// Listen to row activation.
    pub fn on_row_activated(&self, listener: impl FnMut(&R) + Send + 'static) -> Subscription {
        self.row_activated.subscribe(listener)
    }
}

impl<R: TableRow> std::fmt::Debug for TableWidget<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableWidget")
            .field("columns", &self.columns)
            .field("aria_label", &self.aria_label)
            .field("paging_mode", &self.paging_mode())
            .field("page", &self.view.page())
            .finish_non_exhaustive()
    }
}
