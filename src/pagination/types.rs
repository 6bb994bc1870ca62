//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue {
        /// Query parameters to add/replace
        query_params: HashMap<String, String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a single parameter
    pub fn with_param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(key.into(), value.into());
        Self::Continue {
            query_params: params,
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Page size sent with each request
    pub page_size: Option<u32>,
    /// Current cursor value
    pub cursor: Option<String>,
    /// Pages fetched so far
    pub pages: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state that requests pages of `size` records
    pub fn with_page_size(size: u32) -> Self {
        Self {
            page_size: Some(size),
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Record one fetched page holding `count` records
    pub fn add_page(&mut self, count: usize) {
        self.pages += 1;
        self.total_fetched += count as u64;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the next request, given the current state
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String>;

    /// Process a response and determine if there's a next page
    fn process_response(&self, body: &Value, state: &mut PaginationState) -> NextPage;

    /// Does `initial_params` carry the page size. When it does not, the
    /// caller's own `page_size` is sent as given.
    fn sends_page_size(&self) -> bool {
        true
    }
}

/// Find the record list in a response body: the first top-level field whose
/// value is a non-empty array. Field order is the order the API sent.
pub fn first_record_list(body: &Value) -> Option<&Vec<Value>> {
    body.as_object()?
        .values()
        .find_map(|v| v.as_array().filter(|a| !a.is_empty()))
}

/// Length of the array stored under `key`, or of the first array field
pub fn record_count(body: &Value, key: Option<&str>) -> usize {
    let by_key = key
        .and_then(|k| body.get(k))
        .and_then(Value::as_array)
        .map(Vec::len);
    by_key
        .or_else(|| first_record_list(body).map(Vec::len))
        .unwrap_or(0)
}

/// Render a cursor value as a query parameter string
pub(crate) fn cursor_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
