//! Stream definition types
//!
//! A stream is described by static data: its identity fields, the fields it
//! can be replicated on, and where its records come from. Everything that
//! varies per run lives in [`RunConfig`].

use crate::types::ReplicationMethod;

/// How an endpoint continues to the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationKind {
    /// Single request
    None,
    /// `after` = id of the last record in the page
    ListTail,
    /// `after` = `pagination_meta.after` from the response
    PaginationMeta,
}

/// One list endpoint of the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path relative to the API base URL
    pub path: &'static str,
    /// Response field holding the record list
    pub records_key: &'static str,
    /// Continuation strategy
    pub pagination: PaginationKind,
}

impl Endpoint {
    /// Endpoint answered in a single response
    pub const fn single(path: &'static str, records_key: &'static str) -> Self {
        Self {
            path,
            records_key,
            pagination: PaginationKind::None,
        }
    }

    /// Endpoint paginated with the list-tail cursor
    pub const fn paged(path: &'static str, records_key: &'static str) -> Self {
        Self {
            path,
            records_key,
            pagination: PaginationKind::ListTail,
        }
    }

    /// Endpoint paginated with `pagination_meta.after`
    pub const fn meta_paged(path: &'static str, records_key: &'static str) -> Self {
        Self {
            path,
            records_key,
            pagination: PaginationKind::PaginationMeta,
        }
    }
}

/// Where a stream's records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySource {
    /// A single list endpoint
    List(Endpoint),
    /// One child listing per parent record, in parent order
    PerParent {
        /// Endpoint listing the parents
        parent: Endpoint,
        /// Endpoint listing children of one parent
        child: Endpoint,
        /// Query parameter carrying the parent id
        param: &'static str,
    },
}

/// Related records attached to each emitted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrichment {
    /// Field added to the record
    pub field: &'static str,
    /// Endpoint listing the related records
    pub endpoint: Endpoint,
    /// Query parameter carrying the record id
    pub param: &'static str,
}

/// Static description of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDefinition {
    /// Stream name (unique)
    pub name: &'static str,
    /// Fields forming the logical primary key
    pub key_properties: &'static [&'static str],
    /// Candidate cursor fields, in preference order
    pub valid_replication_keys: &'static [&'static str],
    /// Mode used when the selection does not ask for one
    pub default_replication_method: ReplicationMethod,
    /// Record source
    pub source: EntitySource,
    /// Per-record enrichment calls
    pub enrichments: &'static [Enrichment],
}

impl StreamDefinition {
    /// Can this stream run incrementally
    pub fn supports_incremental(&self) -> bool {
        !self.valid_replication_keys.is_empty()
    }

    /// Is `field` one of the valid cursor fields
    pub fn is_valid_replication_key(&self, field: &str) -> bool {
        self.valid_replication_keys.contains(&field)
    }

    /// Is `field` part of the primary key
    pub fn is_key_property(&self, field: &str) -> bool {
        self.key_properties.contains(&field)
    }
}

/// Replication settings for one stream in one run.
///
/// Built once per stream per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// FULL_TABLE or INCREMENTAL
    pub replication_method: ReplicationMethod,
    /// Cursor field. Filters records in INCREMENTAL mode; in FULL_TABLE mode
    /// it only names the bookmark seeded at the end of the stream.
    pub replication_key: Option<String>,
}

impl RunConfig {
    /// Full table run bookmarking on `key`
    pub fn full_table(key: Option<&str>) -> Self {
        Self {
            replication_method: ReplicationMethod::FullTable,
            replication_key: key.map(String::from),
        }
    }

    /// Incremental run on `key`
    pub fn incremental(key: &str) -> Self {
        Self {
            replication_method: ReplicationMethod::Incremental,
            replication_key: Some(key.to_string()),
        }
    }

    /// Is this run incremental
    pub fn is_incremental(&self) -> bool {
        self.replication_method.is_incremental()
    }
}
