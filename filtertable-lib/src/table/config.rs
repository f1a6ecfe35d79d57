//! Table configuration

/// Page sizes offered by the paginator unless configured otherwise.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 100];

/// Configuration for a [`TableWidget`](super::TableWidget).
///
/// # Example
///
/// ```
/// use filtertable_lib::table::TableConfig;
///
/// let config = TableConfig::default()
///     .with_page_size(10)
///     .with_aria_label("Securities");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Rows per page on first render.
    ///
    /// Default: 5
    pub page_size: usize,

    /// Page sizes offered by the paginator.
    ///
    /// Default: 5, 10, 25, 100
    pub page_size_options: Vec<usize>,

    /// Accessible name of the table region.
    ///
    /// Default: "Data table"
    pub aria_label: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            aria_label: "Data table".to_string(),
        }
    }
}

impl TableConfig {
    /// Creates a new table config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the page sizes offered by the paginator.
    pub fn with_page_size_options(mut self, options: impl IntoIterator<Item = usize>) -> Self {
        self.page_size_options = options.into_iter().collect();
        self
    }

    /// Sets the accessible name.
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = label.into();
        self
    }
}
