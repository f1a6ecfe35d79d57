//! Query state machine.

use crate::error::ProviderError;
use crate::model::FilterValue;
use crate::query::{PageEvent, PageState, QueryResponse, SanitizedQuery, sanitize};

/// Monotonically increasing request tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of the latest query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// The latest request is in flight.
    Loading,
    /// The latest request succeeded.
    Loaded,
    /// The latest request failed.
    Error,
}

/// A request to send, tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket {
    /// Tag to hand back with the response.
    pub generation: Generation,
    /// The composed query.
    pub request: SanitizedQuery,
}

/// What to do with a provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<R> {
    /// Latest response, successful: publish it.
    Applied(QueryResponse<R>),
    /// Latest response, failed: surface it, keep the rows.
    Failed(ProviderError),
    /// A newer request was issued since: drop it silently.
    Superseded,
}

/// Tracks the desired query and decides which responses may be applied.
///
/// Every filter or page change issues a new [`QueryTicket`] with a fresh
/// [`Generation`]. Only a response carrying the latest generation is
/// applied, whatever order responses arrive in.
#[derive(Debug, Clone)]
pub struct Reconciler {
    filter: Option<FilterValue>,
    page: PageState,
    generation: Generation,
    phase: QueryPhase,
}

impl Reconciler {
    /// Start idle on the first page of `page_size` rows.
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: None,
            page: PageState::new(page_size),
            generation: Generation::default(),
            phase: QueryPhase::Idle,
        }
    }

    /// New filter: back to page 1, then issue.
    pub fn filter_changed(&mut self, filter: FilterValue) -> QueryTicket {
        self.filter = Some(filter);
        self.page.reset();
        self.issue()
    }

    /// New page or page size (0-based index from the paginator).
    pub fn page_changed(&mut self, event: PageEvent) -> QueryTicket {
        self.page.apply(event);
        self.issue()
    }

    /// Re-issue the current query.
    pub fn refresh(&mut self) -> QueryTicket {
        self.issue()
    }

    fn issue(&mut self) -> QueryTicket {
        self.generation = self.generation.next();
        self.phase = QueryPhase::Loading;
        QueryTicket {
            generation: self.generation,
            request: self.compose(),
        }
    }

    /// The query for the current filter and page.
    pub fn compose(&self) -> SanitizedQuery {
        let filters = self.filter.as_ref().map(sanitize).unwrap_or_default();
        SanitizedQuery::for_page(filters, &self.page)
    }

    /// Match a response against the latest generation.
    pub fn resolve<R>(
        &mut self,
        generation: Generation,
        result: Result<QueryResponse<R>, ProviderError>,
    ) -> Resolution<R> {
        if generation != self.generation {
            return Resolution::Superseded;
        }
        match result {
            Ok(response) => {
                self.page.set_total_items(response.total);
                self.phase = QueryPhase::Loaded;
                Resolution::Applied(response)
            }
            Err(error) => {
                self.phase = QueryPhase::Error;
                Resolution::Failed(error)
            }
        }
    }

    /// Returns `true` if `generation` is the latest one issued.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Latest generation issued.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current phase.
    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    /// Whether the latest request is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == QueryPhase::Loading
    }

    /// Current page state.
    pub fn page(&self) -> PageState {
        self.page
    }

    /// Latest filter value received.
    pub fn filter(&self) -> Option<&FilterValue> {
        self.filter.as_ref()
    }
}
