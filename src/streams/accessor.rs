//! Entity accessors
//!
//! An [`EntityAccessor`] turns a stream definition into a lazy sequence of
//! records and performs the per-record enrichment calls. [`ApiAccessor`] is
//! the implementation backed by the incident.io API; tests substitute their
//! own.

use super::types::{Endpoint, EntitySource, PaginationKind, StreamDefinition};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{
    paginate, ListTailPaginator, NoPaginator, PaginationMetaPaginator, Paginator,
};
use crate::types::Record;
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::debug;

/// Source of records for streams
#[async_trait]
pub trait EntityAccessor: Send + Sync {
    /// All records of the stream, in source order
    fn records<'a>(&'a self, def: &'a StreamDefinition) -> BoxStream<'a, Result<Record>>;

    /// Attach the stream's related records to `record`
    async fn enrich(&self, def: &StreamDefinition, record: &mut Record) -> Result<()>;
}

/// Accessor reading from the incident.io API
#[derive(Debug)]
pub struct ApiAccessor {
    client: HttpClient,
    list_tail: ListTailPaginator,
    pagination_meta: PaginationMetaPaginator,
    single: NoPaginator,
}

impl ApiAccessor {
    /// Create an accessor over `client`
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            list_tail: ListTailPaginator::default(),
            pagination_meta: PaginationMetaPaginator::default(),
            single: NoPaginator,
        }
    }

    /// Underlying HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn paginator(&self, kind: PaginationKind) -> &dyn Paginator {
        match kind {
            PaginationKind::None => &self.single,
            PaginationKind::ListTail => &self.list_tail,
            PaginationKind::PaginationMeta => &self.pagination_meta,
        }
    }

    /// Records of one endpoint across all of its pages
    fn endpoint_records<'a>(
        &'a self,
        endpoint: &'a Endpoint,
        request: RequestConfig,
    ) -> impl Stream<Item = Result<Record>> + Send + 'a {
        paginate(
            &self.client,
            endpoint.path,
            request,
            self.paginator(endpoint.pagination),
        )
        .map(move |page| {
            page.and_then(|body| extract_records(&body, endpoint))
                .map(|records| stream::iter(records.into_iter().map(Ok::<Record, Error>)))
        })
        .try_flatten()
    }
}

#[async_trait]
impl EntityAccessor for ApiAccessor {
    fn records<'a>(&'a self, def: &'a StreamDefinition) -> BoxStream<'a, Result<Record>> {
        match &def.source {
            EntitySource::List(endpoint) => {
                self.endpoint_records(endpoint, RequestConfig::new()).boxed()
            }
            EntitySource::PerParent {
                parent,
                child,
                param,
            } => self
                .endpoint_records(parent, RequestConfig::new())
                .map(move |parent_record| {
                    let id = record_id(&parent_record?, parent.path)?;
                    debug!("{}: listing {} for {}", def.name, child.path, id);
                    Ok::<_, Error>(
                        self.endpoint_records(child, RequestConfig::new().query(*param, id)),
                    )
                })
                .try_flatten()
                .boxed(),
        }
    }

    async fn enrich(&self, def: &StreamDefinition, record: &mut Record) -> Result<()> {
        if def.enrichments.is_empty() {
            return Ok(());
        }
        let id = record_id(record, def.name)?;

        for enrichment in def.enrichments {
            let related: Vec<Value> = self
                .endpoint_records(
                    &enrichment.endpoint,
                    RequestConfig::new().query(enrichment.param, id.clone()),
                )
                .map_ok(Value::Object)
                .try_collect()
                .await?;
            record.insert(enrichment.field.to_string(), Value::Array(related));
        }
        Ok(())
    }
}

/// Unwrap the record list of a response body.
///
/// A missing or null list means the endpoint had nothing to return.
pub fn extract_records(body: &Value, endpoint: &Endpoint) -> Result<Vec<Record>> {
    let list = match body.get(endpoint.records_key) {
        None | Some(Value::Null) => {
            debug!(
                "Response from {} has no '{}' list, treating as empty",
                endpoint.path, endpoint.records_key
            );
            return Ok(Vec::new());
        }
        Some(Value::Array(list)) => list,
        Some(other) => {
            return Err(Error::Other(format!(
                "Response from {} has a non-list '{}': {other}",
                endpoint.path, endpoint.records_key
            )))
        }
    };

    list.iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record.clone()),
            other => Err(Error::Other(format!(
                "Response from {} holds a non-object record: {other}",
                endpoint.path
            ))),
        })
        .collect()
}

/// The `id` of a record as a string
fn record_id(record: &Record, context: &str) -> Result<String> {
    match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(Error::Other(format!("{context}: record without an id"))),
    }
}
