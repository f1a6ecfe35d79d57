//! Query composition.
//!
//! This module turns a [`FilterValue`](crate::model::FilterValue) and the
//! current [`PageState`] into the [`SanitizedQuery`] sent to a data provider.
//!
//! - [`sanitize`] - drops every filter field that does not constrain the query
//! - [`SanitizedQuery`] - active constraints plus `skip`/`limit`
//! - [`PageState`] / [`PageEvent`] - logical paging state and paginator output
//! - [`QueryResponse`] - one page of rows plus the total match count

mod page;
mod request;
mod sanitize;

pub use page::PageEvent;
pub use page::PageState;
pub use request::QueryResponse;
pub use request::SanitizedQuery;
pub use sanitize::sanitize;
