//! State types for tracking replication progress
//!
//! These types are serialized to JSON and persisted between runs:
//! `{"bookmarks": {stream: {field: value}}}`. A missing stream or field key
//! means "no bookmark"; nulls are never written.

use crate::cursor::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Bookmarks for one stream, keyed by cursor field
pub type StreamBookmarks = BTreeMap<String, Value>;

/// Complete replication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmarks>,

    /// Top-level keys written by other tools, carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bookmark for (stream, field), if it is a string
    pub fn get_bookmark(&self, stream: &str, field: &str) -> Option<&str> {
        self.bookmarks.get(stream)?.get(field)?.as_str()
    }

    /// Overwrite the bookmark for (stream, field)
    pub fn set_bookmark(&mut self, stream: &str, field: &str, value: impl Into<String>) {
        self.bookmarks
            .entry(stream.to_string())
            .or_default()
            .insert(field.to_string(), Value::String(value.into()));
    }

    /// Drop every bookmark of `stream`
    pub fn reset_stream(&mut self, stream: &str) -> bool {
        self.bookmarks.remove(stream).is_some()
    }

    /// Store `raw` only if `at` is strictly newer than the current bookmark.
    ///
    /// A stored value that does not parse as a timestamp cannot be compared
    /// and is replaced. Returns whether the bookmark changed.
    pub fn advance_bookmark(
        &mut self,
        stream: &str,
        field: &str,
        raw: &str,
        at: DateTime<Utc>,
    ) -> bool {
        let current = self.bookmarks.get(stream).and_then(|b| b.get(field));
        let newer = match current {
            None => true,
            Some(value) => match value.as_str().and_then(parse_timestamp) {
                Some(stored) => at > stored,
                None => {
                    warn!(
                        "Replacing unparseable bookmark {}.{} = {}",
                        stream, field, value
                    );
                    true
                }
            },
        };

        if newer {
            self.set_bookmark(stream, field, raw);
        }
        newer
    }

    /// Serialize as a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({ "bookmarks": {} }))
    }
}
