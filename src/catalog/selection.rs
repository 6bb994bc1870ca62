//! Selection resolution
//!
//! Turns a catalog into per-stream run decisions: whether the stream is
//! included, which fields are emitted and how it is replicated.

use super::discover::discover;
use super::types::{Catalog, CatalogEntry, Metadata};
use crate::error::Result;
use crate::schema::schema_value;
use crate::streams::{registry, RunConfig, StreamDefinition};
use crate::types::ReplicationMethod;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Run decisions for one catalog entry
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    /// Stream identifier from the catalog
    pub tap_stream_id: String,
    /// Is the stream included in this run
    pub selected: bool,
    /// Fields emitted for each record
    pub fields: HashSet<String>,
    /// Replication settings
    pub run: RunConfig,
    /// Full schema of the stream (before projection)
    pub schema: Value,
    /// Identity fields
    pub key_properties: Vec<String>,
    /// Registry entry; `None` when the catalog names an unknown stream
    pub definition: Option<&'static StreamDefinition>,
}

/// Resolve every entry of `catalog`, or of the discovered catalog when none
/// is given. Entries come back in catalog order.
pub fn resolve(catalog: Option<&Catalog>) -> Result<Vec<ResolvedStream>> {
    let discovered;
    let catalog = match catalog {
        Some(catalog) => catalog,
        None => {
            discovered = discover()?;
            &discovered
        }
    };

    catalog.streams.iter().map(resolve_entry).collect()
}

/// Resolve one catalog entry
pub fn resolve_entry(entry: &CatalogEntry) -> Result<ResolvedStream> {
    let definition = registry::find(&entry.tap_stream_id);
    let stream_md = entry.stream_metadata();

    // stream metadata missing: not selected
    let selected = stream_md.is_some_and(|md| md.is_selected_or(false));

    let schema = match definition {
        Some(def) if entry.schema_fields().is_empty() => schema_value(def.name)?,
        _ => entry.schema.clone(),
    };

    let key_properties = match definition {
        Some(def) => def.key_properties.iter().map(ToString::to_string).collect(),
        None => entry.key_properties.clone(),
    };

    let fields = selected_fields(entry, &schema, &key_properties);

    let run = match definition {
        Some(def) => run_config(def, entry, stream_md),
        None => RunConfig::full_table(None),
    };

    Ok(ResolvedStream {
        tap_stream_id: entry.tap_stream_id.clone(),
        selected,
        fields,
        run,
        schema,
        key_properties,
        definition,
    })
}

/// Included fields: identity fields always, the rest by their own metadata.
/// A field without metadata is included.
fn selected_fields(entry: &CatalogEntry, schema: &Value, key_properties: &[String]) -> HashSet<String> {
    let mut fields: HashSet<String> = key_properties.iter().cloned().collect();

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for name in properties.keys() {
            let included = entry
                .field_metadata(name)
                .map_or(true, |md| md.is_selected_or(false));
            if included {
                fields.insert(name.clone());
            }
        }
    }
    fields
}

/// Forced method, else the requested method, else FULL_TABLE. The cursor
/// field is the requested one when valid, else the first valid one.
fn run_config(def: &StreamDefinition, entry: &CatalogEntry, md: Option<&Metadata>) -> RunConfig {
    let forced = md
        .and_then(|m| m.forced_replication_method.as_deref())
        .and_then(ReplicationMethod::parse);
    let requested = md
        .and_then(|m| m.replication_method.as_deref())
        .or(entry.replication_method.as_deref())
        .and_then(ReplicationMethod::parse);
    let method = forced.or(requested).unwrap_or(ReplicationMethod::FullTable);

    let requested_key = md
        .and_then(|m| m.replication_key.as_deref())
        .or(entry.replication_key.as_deref());
    let key = match requested_key {
        Some(key) if def.is_valid_replication_key(key) => Some(key),
        Some(key) => {
            if method.is_incremental() {
                warn!(
                    "{}: '{}' is not a valid replication key, using {:?}",
                    def.name,
                    key,
                    def.valid_replication_keys.first()
                );
            }
            def.valid_replication_keys.first().copied()
        }
        None => def.valid_replication_keys.first().copied(),
    };

    match (method, key) {
        (ReplicationMethod::Incremental, Some(key)) => RunConfig::incremental(key),
        (ReplicationMethod::Incremental, None) => {
            warn!(
                "{}: INCREMENTAL requested but the stream has no replication key, running FULL_TABLE",
                def.name
            );
            RunConfig::full_table(None)
        }
        (ReplicationMethod::FullTable, key) => RunConfig::full_table(key),
    }
}
