//! Provider request and response types.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::PageState;
use crate::model::Value;

/// The query sent to a data provider.
///
/// Holds only the filter fields that constrain the result; a missing key
/// means "no constraint". Serializes as one flat object:
/// `{"name": "Ac", "type": ["Equity"], "skip": 0, "limit": 5}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SanitizedQuery {
    #[serde(flatten)]
    filters: BTreeMap<String, Value>,
    skip: usize,
    limit: usize,
}

impl SanitizedQuery {
    /// Creates a query from already sanitized filters and paging bounds.
    pub fn new(filters: BTreeMap<String, Value>, skip: usize, limit: usize) -> Self {
        Self {
            filters,
            skip,
            limit,
        }
    }

    /// Creates a query for the page described by `page`.
    pub fn for_page(filters: BTreeMap<String, Value>, page: &PageState) -> Self {
        Self::new(filters, page.skip(), page.page_size())
    }

    /// Active filter constraints.
    pub fn filters(&self) -> &BTreeMap<String, Value> {
        &self.filters
    }

    /// Constraint on the named field, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.filters.get(name)
    }

    /// Rows to skip.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Maximum rows to return.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns `true` if no filter constrains the query.
    pub fn is_unconstrained(&self) -> bool {
        self.filters.is_empty()
    }
}

/// One page of rows and the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse<R> {
    /// Rows of the requested page.
    pub data: Vec<R>,
    /// Rows matching the filter across all pages.
    pub total: usize,
}

impl<R> QueryResponse<R> {
    /// Creates a new response.
    pub fn new(data: Vec<R>, total: usize) -> Self {
        Self { data, total }
    }

    /// A response with no rows.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat() {
        let mut filters = BTreeMap::new();
        filters.insert("name".to_string(), Value::from("Ac"));
        filters.insert("isPrivate".to_string(), Value::from(false));
        let query = SanitizedQuery::new(filters, 10, 5);

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"name": "Ac", "isPrivate": false, "skip": 10, "limit": 5})
        );
    }
}
