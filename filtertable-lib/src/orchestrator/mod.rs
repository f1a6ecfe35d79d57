//! Query orchestration.
//!
//! [`QueryOrchestrator`] binds a [`TableWidget`] to a [`DataProvider`]. It
//! listens to the widget's filter and page outputs, sanitizes the filter,
//! composes a [`SanitizedQuery`](crate::query::SanitizedQuery) and publishes
//! the results back into the widget's [`TableView`].
//!
//! Responses can arrive in any order. Every request is tagged with a
//! [`Generation`] and only the latest one is ever applied; older responses
//! are dropped without touching the view, so stale rows never flash on
//! screen.
//!
//! The orchestrator runs as a single task:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use filtertable_lib::orchestrator::{OrchestratorConfig, QueryOrchestrator};
//! # use filtertable_lib::provider::InMemoryProvider;
//! # use filtertable_lib::table::{TableConfig, TableWidget};
//! # async fn demo() {
//! let mut table = TableWidget::<serde_json::Value>::new(["name"], TableConfig::default());
//! let provider = Arc::new(InMemoryProvider::<serde_json::Value>::new(Vec::new()));
//! let config = OrchestratorConfig::default();
//! let orchestrator = QueryOrchestrator::connect(&mut table, provider, config);
//! tokio::spawn(orchestrator.run());
//! # }
//! ```

mod config;
mod reconcile;

pub use config::OrchestratorConfig;
pub use reconcile::Generation;
pub use reconcile::QueryPhase;
pub use reconcile::QueryTicket;
pub use reconcile::Reconciler;
pub use reconcile::Resolution;

use std::sync::Arc;

use futures::StreamExt;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::ProviderError;
use crate::events::{EventEmitter, Subscription};
use crate::model::FilterValue;
use crate::provider::DataProvider;
use crate::query::{PageEvent, QueryResponse};
use crate::table::{TableRow, TableView, TableWidget};

type Outcome<R> = (Generation, Result<QueryResponse<R>, ProviderError>);

/// Widget output as seen by the orchestrator.
#[derive(Debug, Clone)]
enum TableEvent {
    FilterChanged(FilterValue),
    PageChanged(PageEvent),
    Refresh,
}

/// Drives provider queries for one table.
pub struct QueryOrchestrator<R: TableRow> {
    provider: Arc<dyn DataProvider<R>>,
    config: OrchestratorConfig,
    reconciler: Reconciler,
    view: TableView<R>,
    events: mpsc::UnboundedReceiver<TableEvent>,
    errors: EventEmitter<ProviderError>,
    in_flight: FuturesUnordered<BoxFuture<'static, Outcome<R>>>,
    /// Filter query waiting out the debounce window.
    pending: Option<(QueryTicket, Instant)>,
    _bindings: Vec<Subscription>,
}

impl<R: TableRow> QueryOrchestrator<R> {
    /// Bind `table` to `provider`.
    ///
    /// Switches the table to external paging and queues the first query for
    /// the table's current filter value (or an unfiltered query if the table
    /// has no filter form yet). Nothing is sent until [`run`](Self::run) is
    /// polled.
    pub fn connect(
        table: &mut TableWidget<R>,
        provider: Arc<dyn DataProvider<R>>,
        config: OrchestratorConfig,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        table.set_external_paging(true);

        let filter_tx = tx.clone();
        let filter_binding = table.on_filter_changed(move |value| {
            let _ = filter_tx.send(TableEvent::FilterChanged(value.clone()));
        });
        let page_tx = tx.clone();
        let page_binding = table.on_page_changed(move |event| {
            let _ = page_tx.send(TableEvent::PageChanged(*event));
        });

        let initial = match table.filter_value() {
            Some(value) => TableEvent::FilterChanged(value.clone()),
            None => TableEvent::Refresh,
        };
        let _ = tx.send(initial);

        let view = table.view();
        view.set_loading(true);

        log::debug!(
            "Orchestrator connected (debounce {:?}, timeout {:?})",
            config.debounce,
            config.request_timeout
        );

        Self {
            provider,
            reconciler: Reconciler::new(table.page().page_size()),
            config,
            view,
            events,
            errors: EventEmitter::new(),
            in_flight: FuturesUnordered::new(),
            pending: None,
            _bindings: vec![filter_binding, page_binding],
        }
    }

    /// Register a listener for provider failures of the latest query.
    pub fn on_error(&self, listener: impl FnMut(&ProviderError) + Send + 'static) -> Subscription {
        self.errors.subscribe(listener)
    }

    /// Current query phase.
    pub fn phase(&self) -> QueryPhase {
        self.reconciler.phase()
    }

    /// Process widget events and provider responses until the table is
    /// dropped.
    pub async fn run(mut self) {
        loop {
            let deadline = self.pending.as_ref().map(|(_, at)| *at);

            tokio::select! {
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some((generation, result)) = self.in_flight.next(),
                    if !self.in_flight.is_empty() =>
                {
                    self.handle_outcome(generation, result);
                }
                _ = sleep_until_optional(deadline) => {
                    if let Some((ticket, _)) = self.pending.take() {
                        self.dispatch(ticket);
                    }
                }
            }
        }

        log::debug!(
            "Table dropped, orchestrator stopping with {} requests in flight",
            self.in_flight.len()
        );
    }

    // -------------------------------------------------------------------------
    // Event handling
    // -------------------------------------------------------------------------

    fn handle_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::FilterChanged(filter) => {
                let ticket = self.reconciler.filter_changed(filter);
                self.view.set_page(self.reconciler.page());
                self.view.set_loading(true);

                if self.config.debounce.is_zero() {
                    self.pending = None;
                    self.dispatch(ticket);
                } else {
                    log::trace!("Debouncing query {}", ticket.generation);
                    self.pending = Some((ticket, Instant::now() + self.config.debounce));
                }
            }
            TableEvent::PageChanged(event) => {
                let ticket = self.reconciler.page_changed(event);
                self.pending = None;
                self.view.set_loading(true);
                self.dispatch(ticket);
            }
            TableEvent::Refresh => {
                let ticket = self.reconciler.refresh();
                self.pending = None;
                self.view.set_loading(true);
                self.dispatch(ticket);
            }
        }
    }

    fn dispatch(&mut self, ticket: QueryTicket) {
        log::debug!(
            "Query {}: skip {}, limit {}, {} filters",
            ticket.generation,
            ticket.request.skip(),
            ticket.request.limit(),
            ticket.request.filters().len()
        );

        let provider = Arc::clone(&self.provider);
        let timeout = self.config.request_timeout;
        let request = async move {
            let query = provider.query(&ticket.request);
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, query)
                    .await
                    .unwrap_or_else(|_| Err(ProviderError::Timeout(limit))),
                None => query.await,
            };
            (ticket.generation, result)
        };
        self.in_flight.push(request.boxed());
    }

    fn handle_outcome(
        &mut self,
        generation: Generation,
        result: Result<QueryResponse<R>, ProviderError>,
    ) {
        match self.reconciler.resolve(generation, result) {
            Resolution::Applied(response) => {
                let total = response.total;
                let diff = self.view.apply_response(response.data, self.reconciler.page());
                log::debug!(
                    "Query {} applied: {} total, {} inserted, {} removed",
                    generation,
                    total,
                    diff.inserted.len(),
                    diff.removed.len()
                );
            }
            Resolution::Failed(error) => {
                log::warn!(
                    "Query {} failed ({}): {}",
                    generation,
                    if error.is_retryable() { "retryable" } else { "permanent" },
                    error
                );
                self.view.fail(error.clone());
                self.errors.emit(&error);
            }
            Resolution::Superseded => {
                log::debug!(
                    "Dropping response {} (latest is {})",
                    generation,
                    self.reconciler.generation()
                );
            }
        }
    }
}

/// Sleep until a deadline, or wait forever if None.
async fn sleep_until_optional(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

impl<R: TableRow> std::fmt::Debug for QueryOrchestrator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("config", &self.config)
            .field("reconciler", &self.reconciler)
            .field("in_flight", &self.in_flight.len())
            .field("pending", &self.pending.as_ref().map(|(t, _)| t.generation))
            .finish()
    }
}
