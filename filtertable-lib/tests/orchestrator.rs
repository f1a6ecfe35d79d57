//! Query orchestration against in-memory and scripted providers.
//!
//! All tests run on paused tokio time, so provider delays and debounce
//! windows elapse instantly but in order.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use filtertable_lib::error::{PagingError, ProviderError};
use filtertable_lib::model::{FieldDescriptor, PartialFilter, Value};
use filtertable_lib::orchestrator::{OrchestratorConfig, QueryOrchestrator};
use filtertable_lib::provider::{DataProvider, InMemoryProvider};
use filtertable_lib::query::{QueryResponse, SanitizedQuery};
use filtertable_lib::table::{RenderState, TableConfig, TableWidget};
use serde_json::json;
use tokio::sync::oneshot;

type Row = serde_json::Value;

fn securities() -> Vec<Row> {
    [
        (1, "Acme Corp", "Equity", "USD", false),
        (2, "Acorn Bond 2030", "Bond", "EUR", true),
        (3, "Beta Holdings", "Equity", "EUR", false),
        (4, "Gamma Fund", "Fund", "USD", true),
    ]
    .into_iter()
    .map(|(id, name, kind, currency, private)| {
        json!({
            "id": id,
            "name": name,
            "type": kind,
            "currency": currency,
            "isPrivate": private,
        })
    })
    .collect()
}

fn numbered(count: i64) -> Vec<Row> {
    (1..=count)
        .map(|i| json!({"id": i, "name": format!("Row {i}")}))
        .collect()
}

fn filter_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("name", "Name"),
        FieldDescriptor::multi_select("type", "Type", ["Equity", "Bond", "Fund"]),
        FieldDescriptor::select("currency", "Currency", ["USD", "EUR"]),
        FieldDescriptor::boolean("isPrivate", "Private").with_default(Value::Null),
    ]
}

fn table() -> TableWidget<Row> {
    let mut table = TableWidget::new(["name", "type", "currency"], TableConfig::default());
    table
        .set_filter_fields(filter_fields())
        .expect("valid filter schema");
    table
}

fn names(table: &TableWidget<Row>) -> Vec<String> {
    table
        .view()
        .visible_rows()
        .into_iter()
        .filter_map(|r| r.row["name"].as_str().map(str::to_string))
        .collect()
}

fn connect(
    table: &mut TableWidget<Row>,
    provider: Arc<dyn DataProvider<Row>>,
) -> QueryOrchestrator<Row> {
    QueryOrchestrator::connect(table, provider, OrchestratorConfig::default())
}

/// Let spawned tasks run and paused time advance by `ms`.
async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// -----------------------------------------------------------------------------
// Scripted providers
// -----------------------------------------------------------------------------

type Reply = Result<QueryResponse<Row>, ProviderError>;

/// Holds every query until the test answers it.
#[derive(Default)]
struct GatedProvider {
    gates: Mutex<Vec<(SanitizedQuery, Option<oneshot::Sender<Reply>>)>>,
}

impl GatedProvider {
    fn requests(&self) -> Vec<SanitizedQuery> {
        self.gates
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    fn answer(&self, index: usize, reply: Reply) {
        let sender = self.gates.lock().unwrap()[index].1.take().unwrap();
        let _ = sender.send(reply);
    }
}

#[async_trait]
impl DataProvider<Row> for GatedProvider {
    async fn query(&self, request: &SanitizedQuery) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push((request.clone(), Some(tx)));
        rx.await
            .unwrap_or_else(|_| Err(ProviderError::backend("gate dropped")))
    }
}

/// Fails whenever the name filter is "boom".
struct FlakyProvider {
    inner: InMemoryProvider<Row>,
}

#[async_trait]
impl DataProvider<Row> for FlakyProvider {
    async fn query(&self, request: &SanitizedQuery) -> Reply {
        if request.get("name") == Some(&Value::from("boom")) {
            return Err(ProviderError::backend_with_code("backend exploded", "E500"));
        }
        self.inner.query(request).await
    }
}

// -----------------------------------------------------------------------------
// End to end
// -----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_typing_filter_never_flashes_stale_rows() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::from_secs(1)));
    let orchestrator = connect(&mut table, provider.clone());
    assert!(table.is_loading());
    tokio::spawn(orchestrator.run());

    // Initial unfiltered query is in flight; the user types before it lands.
    settle(10).await;
    table.edit_filter("name", "Ac").unwrap();

    settle(500).await;
    assert!(table.is_loading());
    assert!(matches!(table.render(), RenderState::Loading));

    // The initial query lands at t=1000 and is dropped.
    settle(495).await;
    assert!(table.is_loading());
    assert!(table.view().rows().is_empty());

    // The "Ac" query lands at t=1010.
    settle(100).await;
    assert!(!table.is_loading());
    assert_eq!(names(&table), vec!["Acme Corp", "Acorn Bond 2030"]);
    assert_eq!(table.page().total_items(), 2);

    table.edit_filter("name", "Acx").unwrap();
    settle(10).await;
    assert!(table.is_loading());
    settle(1000).await;
    assert!(!table.is_loading());
    assert!(matches!(table.render(), RenderState::Empty));
    assert_eq!(provider.query_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_initial_query_uses_initial_filter_value() {
    let mut table = table();
    let initial: PartialFilter = [("currency".to_string(), Value::from("EUR"))].into();
    table.set_initial_filter_value(initial).unwrap();

    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::ZERO));
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());
    settle(10).await;

    let request = provider.last_request().unwrap();
    assert_eq!(request.get("currency"), Some(&Value::from("EUR")));
    assert_eq!(request.get("name"), None);
    assert_eq!(request.get("isPrivate"), None);
    assert_eq!(names(&table), vec!["Acorn Bond 2030", "Beta Holdings"]);
}

#[tokio::test(start_paused = true)]
async fn test_unsanitized_values_do_not_reach_provider() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::ZERO));
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());

    table.edit_filter("name", "   ").unwrap();
    table.edit_filter("isPrivate", false).unwrap();
    settle(10).await;

    let request = provider.last_request().unwrap();
    assert_eq!(request.get("name"), None);
    assert_eq!(request.get("isPrivate"), Some(&Value::Bool(false)));
    assert_eq!(names(&table), vec!["Acme Corp", "Beta Holdings"]);
}

// -----------------------------------------------------------------------------
// Supersession
// -----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_late_stale_response_is_dropped() {
    let mut table = table();
    let provider = Arc::new(GatedProvider::default());
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());
    settle(1).await;

    table.edit_filter("name", "Beta").unwrap();
    settle(1).await;
    assert_eq!(provider.requests().len(), 2);

    // Newer answers first.
    provider.answer(1, Ok(QueryResponse::new(vec![securities()[2].clone()], 1)));
    settle(1).await;
    assert_eq!(names(&table), vec!["Beta Holdings"]);
    assert!(!table.is_loading());

    // The older, larger answer arrives afterwards and changes nothing.
    provider.answer(0, Ok(QueryResponse::new(securities(), 4)));
    settle(1).await;
    assert_eq!(names(&table), vec!["Beta Holdings"]);
    assert_eq!(table.page().total_items(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_early_stale_response_is_dropped() {
    let mut table = table();
    let provider = Arc::new(GatedProvider::default());
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());
    settle(1).await;

    table.edit_filter("name", "Beta").unwrap();
    settle(1).await;

    provider.answer(0, Ok(QueryResponse::new(securities(), 4)));
    settle(1).await;
    assert!(table.is_loading());
    assert!(table.view().rows().is_empty());

    provider.answer(1, Ok(QueryResponse::new(vec![securities()[2].clone()], 1)));
    settle(1).await;
    assert!(!table.is_loading());
    assert_eq!(names(&table), vec!["Beta Holdings"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_is_dropped() {
    let mut table = table();
    let provider = Arc::new(GatedProvider::default());
    let orchestrator = connect(&mut table, provider.clone());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _sub = orchestrator.on_error(move |e| sink.lock().unwrap().push(e.clone()));
    tokio::spawn(orchestrator.run());
    settle(1).await;

    table.edit_filter("name", "Beta").unwrap();
    settle(1).await;
    provider.answer(0, Err(ProviderError::backend("stale")));
    settle(1).await;

    assert!(errors.lock().unwrap().is_empty());
    assert_eq!(table.view().error(), None);
    assert!(table.is_loading());
}

// -----------------------------------------------------------------------------
// Paging
// -----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_filter_change_resets_to_first_page() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(numbered(23)).with_delay(Duration::ZERO));
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());
    settle(10).await;
    assert_eq!(table.page().total_items(), 23);
    assert_eq!(table.page().page_count(), 5);

    table.load_page(2, 5).unwrap();
    settle(10).await;
    let request = provider.last_request().unwrap();
    assert_eq!((request.skip(), request.limit()), (10, 5));
    assert_eq!(names(&table), vec!["Row 11", "Row 12", "Row 13", "Row 14", "Row 15"]);
    assert_eq!(table.page().page_index(), 3);

    table.edit_filter("name", "Row 2").unwrap();
    settle(10).await;
    let request = provider.last_request().unwrap();
    assert_eq!(request.skip(), 0);
    assert_eq!(table.page().page_index(), 1);
    // "Row 2", "Row 20".."Row 23"
    assert_eq!(table.page().total_items(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_far_page_keeps_orchestrator_running() {
    let mut table = table();
    let delay = Duration::from_millis(100);
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(delay));
    let orchestrator = connect(&mut table, provider.clone());
    let handle = tokio::spawn(orchestrator.run());
    settle(1).await;

    // No total yet, so the page goes out with a saturated skip.
    table.load_page(usize::MAX / 2, 5).unwrap();
    settle(200).await;
    assert!(!handle.is_finished());
    assert!(!table.is_loading());
    assert_eq!(provider.last_request().unwrap().skip(), usize::MAX);
    assert!(table.view().rows().is_empty());
    assert_eq!(table.page().total_items(), 4);

    // With the total known, far pages are refused before any query.
    assert_eq!(
        table.load_page(usize::MAX / 2, 5),
        Err(PagingError::OutOfRange {
            page_index: usize::MAX / 2,
            page_count: 1,
        })
    );
    assert_eq!(provider.query_count(), 2);

    table.edit_filter("name", "Acme").unwrap();
    settle(200).await;
    assert_eq!(names(&table), vec!["Acme Corp"]);
    assert_eq!(table.page().page_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_page_size_change_queries_new_limit() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(numbered(30)).with_delay(Duration::ZERO));
    let orchestrator = connect(&mut table, provider.clone());
    tokio::spawn(orchestrator.run());
    settle(10).await;

    table.load_page(2, 5).unwrap();
    settle(10).await;
    table.set_page_size(10).unwrap();
    settle(10).await;

    let request = provider.last_request().unwrap();
    assert_eq!((request.skip(), request.limit()), (10, 10));
    assert_eq!(table.view().visible_len(), 10);
    assert_eq!(table.page().page_index(), 2);
}

// -----------------------------------------------------------------------------
// Failures, debounce, timeout
// -----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_provider_error_keeps_rows_and_clears_loading() {
    let mut table = table();
    let provider = Arc::new(FlakyProvider {
        inner: InMemoryProvider::new(securities()).with_delay(Duration::ZERO),
    });
    let orchestrator = connect(&mut table, provider);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _sub = orchestrator.on_error(move |e| sink.lock().unwrap().push(e.clone()));
    tokio::spawn(orchestrator.run());
    settle(10).await;
    assert_eq!(table.view().visible_len(), 4);

    table.edit_filter("name", "boom").unwrap();
    settle(10).await;
    assert!(!table.is_loading());
    assert_eq!(table.view().visible_len(), 4);
    let error = table.view().error().unwrap();
    assert_eq!(error.error_code(), Some("E500"));
    assert_eq!(errors.lock().unwrap().len(), 1);

    table.edit_filter("name", "Gamma").unwrap();
    settle(10).await;
    assert_eq!(table.view().error(), None);
    assert_eq!(names(&table), vec!["Gamma Fund"]);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_sends_only_the_latest_filter() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::ZERO));
    let config = OrchestratorConfig::default().with_debounce(Duration::from_millis(300));
    let orchestrator = QueryOrchestrator::connect(&mut table, provider.clone(), config);
    tokio::spawn(orchestrator.run());

    for text in ["A", "Ac", "Acm"] {
        settle(10).await;
        table.edit_filter("name", text).unwrap();
    }
    settle(100).await;
    assert_eq!(provider.query_count(), 0);
    assert!(table.is_loading());

    settle(300).await;
    assert_eq!(provider.query_count(), 1);
    assert_eq!(provider.last_request().unwrap().get("name"), Some(&Value::from("Acm")));
    assert_eq!(names(&table), vec!["Acme Corp"]);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_surfaces_error() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::from_secs(5)));
    let config = OrchestratorConfig::default().with_request_timeout(Duration::from_secs(1));
    let orchestrator = QueryOrchestrator::connect(&mut table, provider, config);
    tokio::spawn(orchestrator.run());

    settle(1100).await;
    assert!(!table.is_loading());
    assert_eq!(table.view().error(), Some(ProviderError::Timeout(Duration::from_secs(1))));
}

#[tokio::test(start_paused = true)]
async fn test_run_ends_when_table_is_dropped() {
    let mut table = table();
    let provider = Arc::new(InMemoryProvider::new(securities()).with_delay(Duration::ZERO));
    let orchestrator = connect(&mut table, provider);
    let handle = tokio::spawn(orchestrator.run());
    settle(10).await;

    drop(table);
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("orchestrator stops")
        .unwrap();
}
