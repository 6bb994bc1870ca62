//! Catalog types
//!
//! The catalog (selection document) lists streams with their schema and a
//! metadata map keyed by breadcrumb: `[]` for the stream itself and
//! `["properties", field]` for each field.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Breadcrumb prefix of field-level metadata
pub const PROPERTIES: &str = "properties";

/// Selection document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Stream entries
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a catalog from a JSON file. Read or parse failures are fatal.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::catalog(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_json(&contents)
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::catalog(format!("Invalid catalog: {e}")))
    }

    /// Find an entry by stream id
    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|s| s.tap_stream_id == tap_stream_id)
    }

    /// Find an entry by stream id, mutably
    pub fn get_mut(&mut self, tap_stream_id: &str) -> Option<&mut CatalogEntry> {
        self.streams
            .iter_mut()
            .find(|s| s.tap_stream_id == tap_stream_id)
    }
}

/// One stream of the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream name
    #[serde(default)]
    pub stream: String,

    /// Stable stream identifier
    pub tap_stream_id: String,

    /// JSON schema of the stream's records
    #[serde(default)]
    pub schema: Value,

    /// Identity fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Breadcrumb-keyed annotations
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,

    /// Legacy entry-level replication method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,

    /// Legacy entry-level replication key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
}

impl CatalogEntry {
    /// Metadata at `breadcrumb`
    pub fn metadata_at(&self, breadcrumb: &[&str]) -> Option<&Metadata> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.iter().map(String::as_str).eq(breadcrumb.iter().copied()))
            .map(|m| &m.metadata)
    }

    /// Stream-level metadata
    pub fn stream_metadata(&self) -> Option<&Metadata> {
        self.metadata_at(&[])
    }

    /// Mutable stream-level metadata, created when missing
    pub fn stream_metadata_mut(&mut self) -> &mut Metadata {
        let index = match self.metadata.iter().position(|m| m.breadcrumb.is_empty()) {
            Some(index) => index,
            None => {
                self.metadata.insert(0, MetadataEntry::new(Vec::new(), Metadata::default()));
                0
            }
        };
        &mut self.metadata[index].metadata
    }

    /// Metadata of one field
    pub fn field_metadata(&self, field: &str) -> Option<&Metadata> {
        self.metadata_at(&[PROPERTIES, field])
    }

    /// Top-level property names of the schema, in schema order
    pub fn schema_fields(&self) -> Vec<String> {
        self.schema
            .get(PROPERTIES)
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Metadata entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Location in the schema; empty for the stream itself
    #[serde(default)]
    pub breadcrumb: Vec<String>,
    /// Annotations
    #[serde(default)]
    pub metadata: Metadata,
}

impl MetadataEntry {
    /// Create an entry
    pub fn new(breadcrumb: Vec<String>, metadata: Metadata) -> Self {
        Self {
            breadcrumb,
            metadata,
        }
    }

    /// Field-level entry for `field`
    pub fn field(field: &str, metadata: Metadata) -> Self {
        Self::new(vec![PROPERTIES.to_string(), field.to_string()], metadata)
    }
}

/// Whether a field or stream can be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusion {
    /// Always emitted
    Automatic,
    /// Emitted when selected
    Available,
    /// Never emitted
    Unsupported,
}

/// Annotations at one breadcrumb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    /// Inclusion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<Inclusion>,

    /// Explicit selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    /// Selection when `selected` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_by_default: Option<bool>,

    /// Identity fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_key_properties: Option<Vec<String>>,

    /// Cursor fields the stream supports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_replication_keys: Option<Vec<String>>,

    /// Method the stream is restricted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_replication_method: Option<String>,

    /// Requested method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,

    /// Requested cursor field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Annotations this tap does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Explicit selection, else the default, else `fallback`
    pub fn is_selected_or(&self, fallback: bool) -> bool {
        match self.inclusion {
            Some(Inclusion::Automatic) => true,
            Some(Inclusion::Unsupported) => false,
            _ => self
                .selected
                .or(self.selected_by_default)
                .unwrap_or(fallback),
        }
    }
}
