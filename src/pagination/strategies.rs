//! Pagination strategy implementations
//!
//! Each strategy handles one continuation pattern used by incident.io.

use super::types::{cursor_string, first_record_list, NextPage, PaginationState, Paginator};
use serde_json::Value;
use std::collections::HashMap;

/// Query parameter carrying the continuation cursor
pub const AFTER_PARAM: &str = "after";

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "page_size";

fn base_params(param: &str, state: &PaginationState) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(size) = state.page_size {
        params.insert(PAGE_SIZE_PARAM.to_string(), size.to_string());
    }
    if let Some(cursor) = &state.cursor {
        params.insert(param.to_string(), cursor.clone());
    }
    params
}

// ============================================================================
// List-tail Pagination
// ============================================================================

/// Cursor derived from the last record of the page.
///
/// Most list endpoints do not return an explicit continuation token. The
/// next cursor is the `id` of the last element of the first non-empty array
/// in the body. Pagination stops when there is no such array, when the last
/// element has no usable `id`, or when the page came back shorter than the
/// requested page size.
#[derive(Debug, Clone)]
pub struct ListTailPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Field of the last record used as cursor
    pub id_field: String,
}

impl Default for ListTailPaginator {
    fn default() -> Self {
        Self {
            cursor_param: AFTER_PARAM.to_string(),
            id_field: "id".to_string(),
        }
    }
}

impl Paginator for ListTailPaginator {
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String> {
        base_params(&self.cursor_param, state)
    }

    fn process_response(&self, body: &Value, state: &mut PaginationState) -> NextPage {
        let Some(records) = first_record_list(body) else {
            state.add_page(0);
            state.mark_done();
            return NextPage::Done;
        };
        state.add_page(records.len());

        let short_page = state
            .page_size
            .is_some_and(|size| records.len() < size as usize);

        let next = records
            .last()
            .and_then(|r| r.get(&self.id_field))
            .and_then(cursor_string);

        match next {
            Some(cursor) if !short_page && state.cursor.as_deref() != Some(cursor.as_str()) => {
                state.set_cursor(cursor.clone());
                NextPage::with_param(&self.cursor_param, cursor)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// Pagination Meta
// ============================================================================

/// Explicit continuation token under `pagination_meta.after`
#[derive(Debug, Clone)]
pub struct PaginationMetaPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
}

impl Default for PaginationMetaPaginator {
    fn default() -> Self {
        Self {
            cursor_param: AFTER_PARAM.to_string(),
        }
    }
}

impl Paginator for PaginationMetaPaginator {
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String> {
        base_params(&self.cursor_param, state)
    }

    fn process_response(&self, body: &Value, state: &mut PaginationState) -> NextPage {
        state.add_page(first_record_list(body).map_or(0, Vec::len));

        let token = body
            .get("pagination_meta")
            .and_then(|m| m.get("after"))
            .and_then(cursor_string);

        match token {
            Some(token) if state.cursor.as_deref() != Some(token.as_str()) => {
                state.set_cursor(token.clone());
                NextPage::with_param(&self.cursor_param, token)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn initial_params(&self, _state: &PaginationState) -> HashMap<String, String> {
        HashMap::new()
    }

    fn process_response(&self, body: &Value, state: &mut PaginationState) -> NextPage {
        state.add_page(first_record_list(body).map_or(0, Vec::len));
        state.mark_done();
        NextPage::Done
    }

    fn sends_page_size(&self) -> bool {
        false
    }
}
