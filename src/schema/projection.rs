//! Field projection
//!
//! Records and schemas are trimmed to the resolved field set before they
//! reach the output sink.

use crate::types::Record;
use serde_json::Value;
use std::collections::HashSet;

/// Keep only the selected keys of `record`, in the record's own order
pub fn project_record(record: Record, fields: &HashSet<String>) -> Record {
    record
        .into_iter()
        .filter(|(key, _)| fields.contains(key))
        .collect()
}

/// Keep only the selected top-level properties of a schema document
pub fn project_schema(schema: &Value, fields: &HashSet<String>) -> Value {
    let mut projected = schema.clone();
    if let Some(Value::Object(properties)) = projected.get_mut("properties") {
        properties.retain(|key, _| fields.contains(key));
    }
    projected
}
