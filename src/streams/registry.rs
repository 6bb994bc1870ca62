//! Registry of every stream the tap knows
//!
//! Order here is the order of discovery output and of a default sync.

use super::types::{Endpoint, EntitySource, Enrichment, StreamDefinition};
use crate::types::ReplicationMethod::FullTable;
use once_cell::sync::Lazy;
use std::collections::HashMap;

const ID: &[&str] = &["id"];
const UPDATED_AT: &[&str] = &["updated_at"];
const CREATED_AT: &[&str] = &["created_at"];
const NONE: &[&str] = &[];

const INCIDENT_ENRICHMENTS: &[Enrichment] = &[
    Enrichment {
        field: "attachments",
        endpoint: Endpoint::single("v1/incident_attachments", "incident_attachments"),
        param: "incident_id",
    },
    Enrichment {
        field: "updates",
        endpoint: Endpoint::paged("v2/incident_updates", "incident_updates"),
        param: "incident_id",
    },
];

const fn list(
    name: &'static str,
    key_properties: &'static [&'static str],
    valid_replication_keys: &'static [&'static str],
    endpoint: Endpoint,
) -> StreamDefinition {
    StreamDefinition {
        name,
        key_properties,
        valid_replication_keys,
        default_replication_method: FullTable,
        source: EntitySource::List(endpoint),
        enrichments: &[],
    }
}

static STREAMS: &[StreamDefinition] = &[
    list(
        "actions",
        &["id", "incident_id"],
        UPDATED_AT,
        Endpoint::single("v2/actions", "actions"),
    ),
    list(
        "alerts",
        ID,
        CREATED_AT,
        Endpoint::paged("v2/alerts", "alerts"),
    ),
    list(
        "alert_attributes",
        ID,
        NONE,
        Endpoint::single("v2/alert_attributes", "alert_attributes"),
    ),
    list(
        "alert_sources",
        ID,
        NONE,
        Endpoint::single("v2/alert_sources", "alert_sources"),
    ),
    list(
        "custom_fields",
        ID,
        UPDATED_AT,
        Endpoint::single("v2/custom_fields", "custom_fields"),
    ),
    StreamDefinition {
        name: "custom_field_options",
        key_properties: &["id", "custom_field_id"],
        valid_replication_keys: NONE,
        default_replication_method: FullTable,
        source: EntitySource::PerParent {
            parent: Endpoint::single("v2/custom_fields", "custom_fields"),
            child: Endpoint::paged("v1/custom_field_options", "custom_field_options"),
            param: "custom_field_id",
        },
        enrichments: &[],
    },
    list(
        "escalations",
        ID,
        NONE,
        Endpoint::meta_paged("v2/escalations", "escalations"),
    ),
    list(
        "follow_ups",
        &["id", "incident_id"],
        UPDATED_AT,
        Endpoint::single("v2/follow_ups", "follow_ups"),
    ),
    list(
        "incident_roles",
        ID,
        UPDATED_AT,
        Endpoint::single("v2/incident_roles", "incident_roles"),
    ),
    list(
        "incident_statuses",
        ID,
        UPDATED_AT,
        Endpoint::single("v1/incident_statuses", "incident_statuses"),
    ),
    list(
        "incident_timestamps",
        ID,
        NONE,
        Endpoint::single("v2/incident_timestamps", "incident_timestamps"),
    ),
    list(
        "incident_types",
        ID,
        UPDATED_AT,
        Endpoint::single("v1/incident_types", "incident_types"),
    ),
    list(
        "incident_updates",
        &["id", "incident_id"],
        CREATED_AT,
        Endpoint::paged("v2/incident_updates", "incident_updates"),
    ),
    StreamDefinition {
        name: "incidents",
        key_properties: ID,
        valid_replication_keys: UPDATED_AT,
        default_replication_method: FullTable,
        source: EntitySource::List(Endpoint::paged("v2/incidents", "incidents")),
        enrichments: INCIDENT_ENRICHMENTS,
    },
    list(
        "severities",
        ID,
        UPDATED_AT,
        Endpoint::single("v1/severities", "severities"),
    ),
    list("users", ID, NONE, Endpoint::paged("v2/users", "users")),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static StreamDefinition>> =
    Lazy::new(|| STREAMS.iter().map(|def| (def.name, def)).collect());

/// All known streams, in registry order
pub fn all() -> &'static [StreamDefinition] {
    STREAMS
}

/// Look up a stream by name
pub fn find(name: &str) -> Option<&'static StreamDefinition> {
    BY_NAME.get(name).copied()
}

/// Names of all known streams
pub fn names() -> impl Iterator<Item = &'static str> {
    STREAMS.iter().map(|def| def.name)
}
