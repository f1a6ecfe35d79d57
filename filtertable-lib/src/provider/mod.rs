//! Data provider contract.
//!
//! The orchestrator talks to its backing store only through
//! [`DataProvider`]. The transport behind it (HTTP, RPC, a local store) is the
//! provider's business; any implementation can be swapped in without touching
//! the orchestrator.

mod memory;

use async_trait::async_trait;

pub use memory::DEFAULT_DELAY;
pub use memory::FieldSource;
pub use memory::InMemoryProvider;

use crate::error::ProviderError;
use crate::query::{QueryResponse, SanitizedQuery};

/// A source of filtered, paginated rows.
#[async_trait]
pub trait DataProvider<R>: Send + Sync {
    /// Returns the page of rows selected by `request` and the total number of
    /// rows matching its filters.
    async fn query(&self, request: &SanitizedQuery) -> Result<QueryResponse<R>, ProviderError>;
}
