//! Pagination module
//!
//! Supports: list-tail cursor, explicit `pagination_meta.after`, single page
//!
//! # Overview
//!
//! A [`Paginator`] turns each response into the query parameters of the next
//! request. [`paginate`] drives one of them against the HTTP client and
//! exposes the result as a lazy stream of raw page bodies; nothing is fetched
//! until the stream is polled, and pages are requested strictly one after
//! the other.

mod strategies;
mod types;

pub use strategies::{
    ListTailPaginator, NoPaginator, PaginationMetaPaginator, AFTER_PARAM, PAGE_SIZE_PARAM,
};
pub use types::{first_record_list, record_count, NextPage, PaginationState, Paginator};

use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use futures::Stream;
use serde_json::Value;
use tracing::debug;

/// Walk every page of `path`.
///
/// A `page_size` already present in `request` is honored; otherwise the
/// client's default page size is used. Single-page endpoints only send a
/// page size when the caller set one.
pub fn paginate<'a>(
    client: &'a HttpClient,
    path: &'a str,
    mut request: RequestConfig,
    paginator: &'a dyn Paginator,
) -> impl Stream<Item = Result<Value>> + 'a {
    let page_size = request
        .query
        .get(PAGE_SIZE_PARAM)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| client.page_size());
    if paginator.sends_page_size() {
        request.query.remove(PAGE_SIZE_PARAM);
    }
    let state = PaginationState::with_page_size(page_size);

    futures::stream::try_unfold(state, move |mut state| {
        let mut config = request.clone();
        async move {
            if state.done {
                return Ok(None);
            }
            for (key, value) in paginator.initial_params(&state) {
                config = config.query(key, value);
            }
            let body = client.fetch_page(path, config).await?;
            let next = paginator.process_response(&body, &mut state);
            debug!(
                "{}: page {} ({} records so far){}",
                path,
                state.pages,
                state.total_fetched,
                if next.is_done() { ", last page" } else { "" }
            );
            Ok(Some((body, state)))
        }
    })
}
