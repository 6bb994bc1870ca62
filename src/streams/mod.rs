//! Streams module
//!
//! One extraction algorithm serves every entity type. What differs between
//! streams is static data, kept in a registry keyed by stream name.
//!
//! # Overview
//!
//! - `StreamDefinition` - identity fields, valid cursor fields, record source
//! - `registry` - the table of every known stream
//! - `EntityAccessor` - fetches a stream's records and enrichments
//! - `RunConfig` - replication mode and cursor field resolved for one run

mod accessor;
pub mod registry;
mod types;

pub use accessor::{extract_records, ApiAccessor, EntityAccessor};
pub use types::{
    Endpoint, EntitySource, Enrichment, PaginationKind, RunConfig, StreamDefinition,
};
