//! Stream schemas
//!
//! Every stream has a static JSON schema shipped inside the binary. This
//! module exposes the raw documents, a typed view used for Parquet column
//! mapping, and the field projection applied before output.
//!
//! # Features
//!
//! - **Embedded Schemas**: one document per stream under `schemas/`
//! - **Typed Model**: nullable unions, `date-time` formats, nested objects
//! - **Projection**: schemas and records trimmed to the selected fields

mod projection;
mod types;

pub use projection::{project_record, project_schema};
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};

use crate::error::{Error, Result};
use serde_json::Value;

const SCHEMA_SOURCES: &[(&str, &str)] = &[
    ("actions", include_str!("../../schemas/actions.json")),
    ("alert_attributes", include_str!("../../schemas/alert_attributes.json")),
    ("alert_sources", include_str!("../../schemas/alert_sources.json")),
    ("alerts", include_str!("../../schemas/alerts.json")),
    (
        "custom_field_options",
        include_str!("../../schemas/custom_field_options.json"),
    ),
    ("custom_fields", include_str!("../../schemas/custom_fields.json")),
    ("escalations", include_str!("../../schemas/escalations.json")),
    ("follow_ups", include_str!("../../schemas/follow_ups.json")),
    ("incident_roles", include_str!("../../schemas/incident_roles.json")),
    (
        "incident_statuses",
        include_str!("../../schemas/incident_statuses.json"),
    ),
    (
        "incident_timestamps",
        include_str!("../../schemas/incident_timestamps.json"),
    ),
    ("incident_types", include_str!("../../schemas/incident_types.json")),
    ("incident_updates", include_str!("../../schemas/incident_updates.json")),
    ("incidents", include_str!("../../schemas/incidents.json")),
    ("severities", include_str!("../../schemas/severities.json")),
    ("users", include_str!("../../schemas/users.json")),
];

/// Raw embedded schema text for a stream
pub fn raw_schema(stream: &str) -> Option<&'static str> {
    SCHEMA_SOURCES
        .iter()
        .find(|(name, _)| *name == stream)
        .map(|(_, source)| *source)
}

/// Embedded schema for a stream as a JSON value
pub fn schema_value(stream: &str) -> Result<Value> {
    let source = raw_schema(stream).ok_or_else(|| Error::Schema {
        stream: stream.to_string(),
        message: "no schema bundled for this stream".to_string(),
    })?;
    serde_json::from_str(source).map_err(|e| Error::Schema {
        stream: stream.to_string(),
        message: e.to_string(),
    })
}

/// Parse a schema document into the typed model
pub fn parse_schema(stream: &str, schema: &Value) -> Result<JsonSchema> {
    serde_json::from_value(schema.clone()).map_err(|e| Error::Schema {
        stream: stream.to_string(),
        message: e.to_string(),
    })
}

/// Embedded schema for a stream, typed
pub fn load_schema(stream: &str) -> Result<JsonSchema> {
    parse_schema(stream, &schema_value(stream)?)
}

#[cfg(test)]
mod tests;
