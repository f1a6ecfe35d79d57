//! In-memory data provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::DataProvider;
use crate::error::ProviderError;
use crate::model::Value;
use crate::query::{QueryResponse, SanitizedQuery};

/// Delay applied by [`InMemoryProvider`] unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Read access to a row's fields by name, for in-memory filtering.
pub trait FieldSource {
    /// Returns the value of the named field, or `None` if the row lacks it.
    fn field(&self, name: &str) -> Option<Value>;
}

impl FieldSource for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(Value::from_json)
    }
}

/// A mock provider serving rows from memory after an artificial delay.
///
/// Matching rules per constraint:
///
/// - text: case-insensitive substring of the row's text (or any list item)
/// - list: the row's text is one of the items, or a row list shares an item
/// - bool / number: equality
///
/// A row lacking a constrained field never matches.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use filtertable_lib::provider::InMemoryProvider;
///
/// let rows = vec![serde_json::json!({"id": 1, "name": "Acme"})];
/// let provider = InMemoryProvider::new(rows).with_delay(Duration::ZERO);
/// ```
#[derive(Debug)]
pub struct InMemoryProvider<R> {
    rows: RwLock<Vec<R>>,
    delay: Duration,
    queries: AtomicUsize,
    last_request: Mutex<Option<SanitizedQuery>>,
}

impl<R> InMemoryProvider<R> {
    /// Creates a provider over `rows` with the default delay.
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows: RwLock::new(rows),
            delay: DEFAULT_DELAY,
            queries: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Sets the artificial delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Replaces the backing rows.
    pub fn replace_rows(&self, rows: Vec<R>) {
        if let Ok(mut guard) = self.rows.write() {
            *guard = rows;
        }
    }

    /// Number of queries received so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<SanitizedQuery> {
        self.last_request.lock().ok().and_then(|g| g.clone())
    }
}

fn matches_constraint(actual: &Value, constraint: &Value) -> bool {
    if constraint.is_null() {
        return true;
    }
    match (constraint, actual) {
        (Value::Text(needle), Value::Text(s)) => contains_ignore_case(s, needle),
        (Value::Text(needle), Value::List(items)) => {
            items.iter().any(|item| contains_ignore_case(item, needle))
        }
        (Value::List(wanted), Value::Text(s)) => wanted.contains(s),
        (Value::List(wanted), Value::List(items)) => items.iter().any(|i| wanted.contains(i)),
        (Value::Bool(want), Value::Bool(b)) => want == b,
        (Value::Number(want), Value::Number(n)) => want == n,
        _ => false,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

#[async_trait]
impl<R> DataProvider<R> for InMemoryProvider<R>
where
    R: FieldSource + Clone + Send + Sync,
{
    async fn query(&self, request: &SanitizedQuery) -> Result<QueryResponse<R>, ProviderError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        if request.limit() == 0 {
            return Err(ProviderError::InvalidRequest(
                "limit must be greater than zero".to_string(),
            ));
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let rows = self
            .rows
            .read()
            .map_err(|_| ProviderError::backend("row store lock poisoned"))?;
        let matched: Vec<&R> = rows
            .iter()
            .filter(|row| {
                request.filters().iter().all(|(name, constraint)| {
                    row.field(name)
                        .is_some_and(|actual| matches_constraint(&actual, constraint))
                })
            })
            .collect();

        let total = matched.len();
        let data = matched
            .into_iter()
            .skip(request.skip())
            .take(request.limit())
            .cloned()
            .collect();

        Ok(QueryResponse::new(data, total))
    }
}
