//! Catalog discovery
//!
//! Builds the selection document from the stream registry and the embedded
//! schemas. Nothing here touches the network.

use super::types::{Catalog, CatalogEntry, Inclusion, Metadata, MetadataEntry};
use crate::error::Result;
use crate::schema::schema_value;
use crate::streams::{registry, StreamDefinition};
use crate::types::ReplicationMethod;
use tracing::debug;

/// Catalog with every known stream and field selected by default
pub fn discover() -> Result<Catalog> {
    let streams = registry::all()
        .iter()
        .map(catalog_entry)
        .collect::<Result<Vec<_>>>()?;
    Ok(Catalog { streams })
}

/// Catalog entry for one stream
pub fn catalog_entry(def: &StreamDefinition) -> Result<CatalogEntry> {
    debug!("Discovering schema for {}", def.name);
    let mut entry = CatalogEntry {
        stream: def.name.to_string(),
        tap_stream_id: def.name.to_string(),
        schema: schema_value(def.name)?,
        key_properties: strings(def.key_properties),
        ..CatalogEntry::default()
    };

    let mut stream_md = Metadata {
        inclusion: Some(Inclusion::Available),
        selected_by_default: Some(true),
        table_key_properties: Some(strings(def.key_properties)),
        ..Metadata::default()
    };
    if def.supports_incremental() {
        stream_md.valid_replication_keys = Some(strings(def.valid_replication_keys));
        stream_md.replication_method = Some(def.default_replication_method.to_string());
    } else {
        stream_md.forced_replication_method = Some(ReplicationMethod::FullTable.to_string());
    }
    entry.metadata.push(MetadataEntry::new(Vec::new(), stream_md));

    for field in entry.schema_fields() {
        let inclusion = if def.is_key_property(&field) {
            Inclusion::Automatic
        } else {
            Inclusion::Available
        };
        entry.metadata.push(MetadataEntry::field(
            &field,
            Metadata {
                inclusion: Some(inclusion),
                selected_by_default: Some(true),
                ..Metadata::default()
            },
        ));
    }

    Ok(entry)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}
