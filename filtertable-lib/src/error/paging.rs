//! Paging error types

/// Errors raised by the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PagingError {
    /// A page size of zero was requested.
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    /// The requested page lies past the last page of the known total.
    #[error("page {page_index} is out of range ({page_count} pages)")]
    OutOfRange {
        /// Requested 0-based page index.
        page_index: usize,
        /// Pages available for the current total.
        page_count: usize,
    },
}
