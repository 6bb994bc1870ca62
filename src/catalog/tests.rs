//! Tests for catalog discovery and selection

use super::*;
use crate::streams::registry;
use crate::types::ReplicationMethod;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn entry(tap_stream_id: &str, metadata: serde_json::Value) -> CatalogEntry {
    serde_json::from_value(json!({
        "tap_stream_id": tap_stream_id,
        "stream": tap_stream_id,
        "schema": {
            "type": ["object"],
            "properties": {
                "id": {"type": ["string"]},
                "name": {"type": ["string"]},
                "rank": {"type": ["integer"]},
                "updated_at": {"type": ["string"], "format": "date-time"}
            }
        },
        "metadata": metadata
    }))
    .unwrap()
}

fn sorted(fields: &std::collections::HashSet<String>) -> Vec<&str> {
    let mut fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    fields.sort_unstable();
    fields
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[test]
fn test_discover_covers_registry_in_order() {
    let catalog = discover().unwrap();
    let ids: Vec<&str> = catalog.streams.iter().map(|s| s.tap_stream_id.as_str()).collect();
    let names: Vec<&str> = registry::names().collect();
    assert_eq!(ids, names);
}

#[test]
fn test_discover_stream_metadata() {
    let catalog = discover().unwrap();

    let alerts = catalog.get("alerts").unwrap();
    let md = alerts.stream_metadata().unwrap();
    assert_eq!(md.inclusion, Some(Inclusion::Available));
    assert_eq!(md.selected_by_default, Some(true));
    assert_eq!(md.valid_replication_keys, Some(vec!["created_at".to_string()]));
    assert_eq!(md.replication_method.as_deref(), Some("FULL_TABLE"));
    assert!(md.forced_replication_method.is_none());

    let users = catalog.get("users").unwrap();
    let md = users.stream_metadata().unwrap();
    assert_eq!(md.forced_replication_method.as_deref(), Some("FULL_TABLE"));
    assert!(md.valid_replication_keys.is_none());
}

#[test]
fn test_discover_field_metadata() {
    let catalog = discover().unwrap();
    let actions = catalog.get("actions").unwrap();

    assert_eq!(
        actions.field_metadata("incident_id").unwrap().inclusion,
        Some(Inclusion::Automatic)
    );
    assert_eq!(
        actions.field_metadata("status").unwrap().inclusion,
        Some(Inclusion::Available)
    );
    // one stream entry plus one per schema property
    assert_eq!(actions.metadata.len(), 1 + actions.schema_fields().len());
}

#[test]
fn test_discover_serializes_kebab_case() {
    let catalog = discover().unwrap();
    let value = serde_json::to_value(catalog.get("severities").unwrap()).unwrap();
    let md = &value["metadata"][0];
    assert_eq!(md["breadcrumb"], json!([]));
    assert_eq!(md["metadata"]["selected-by-default"], json!(true));
    assert_eq!(md["metadata"]["table-key-properties"], json!(["id"]));
    assert_eq!(md["metadata"]["valid-replication-keys"], json!(["updated_at"]));
}

// ============================================================================
// Selection Tests
// ============================================================================

#[test_case(json!({"selected": true}), true ; "explicit selection")]
#[test_case(json!({"selected": false, "selected-by-default": true}), false ; "explicit deselection wins")]
#[test_case(json!({"selected-by-default": true}), true ; "default selection")]
#[test_case(json!({}), false ; "no flags")]
#[test_case(json!({"inclusion": "unsupported", "selected": true}), false ; "unsupported")]
fn test_stream_selection(md: serde_json::Value, expected: bool) {
    let e = entry("severities", json!([{"breadcrumb": [], "metadata": md}]));
    assert_eq!(resolve_entry(&e).unwrap().selected, expected);
}

#[test]
fn test_missing_stream_metadata_is_not_selected() {
    let e = entry("severities", json!([]));
    assert!(!resolve_entry(&e).unwrap().selected);
}

#[test]
fn test_field_selection() {
    let e = entry(
        "severities",
        json!([
            {"breadcrumb": [], "metadata": {"selected": true}},
            {"breadcrumb": ["properties", "id"], "metadata": {"selected": false}},
            {"breadcrumb": ["properties", "name"], "metadata": {"selected": false, "selected-by-default": true}},
            {"breadcrumb": ["properties", "rank"], "metadata": {"selected-by-default": true}}
        ]),
    );
    let resolved = resolve_entry(&e).unwrap();

    // id is an identity field; updated_at has no metadata
    assert_eq!(sorted(&resolved.fields), vec!["id", "rank", "updated_at"]);
}

#[test]
fn test_replication_resolution_defaults_to_full_table() {
    let e = entry("severities", json!([{"breadcrumb": [], "metadata": {"selected": true}}]));
    let run = resolve_entry(&e).unwrap().run;
    assert_eq!(run.replication_method, ReplicationMethod::FullTable);
    assert_eq!(run.replication_key.as_deref(), Some("updated_at"));
}

#[test]
fn test_requested_incremental() {
    let e = entry(
        "severities",
        json!([{"breadcrumb": [], "metadata": {
            "selected": true,
            "replication-method": "INCREMENTAL",
            "replication-key": "updated_at"
        }}]),
    );
    let run = resolve_entry(&e).unwrap().run;
    assert!(run.is_incremental());
    assert_eq!(run.replication_key.as_deref(), Some("updated_at"));
}

#[test]
fn test_forced_method_wins() {
    let e = entry(
        "severities",
        json!([{"breadcrumb": [], "metadata": {
            "selected": true,
            "forced-replication-method": "FULL_TABLE",
            "replication-method": "INCREMENTAL"
        }}]),
    );
    assert!(!resolve_entry(&e).unwrap().run.is_incremental());
}

#[test]
fn test_invalid_replication_key_falls_back_to_first_valid() {
    let e = entry(
        "alerts",
        json!([{"breadcrumb": [], "metadata": {
            "selected": true,
            "replication-method": "INCREMENTAL",
            "replication-key": "updated_at"
        }}]),
    );
    let run = resolve_entry(&e).unwrap().run;
    assert_eq!(run.replication_key.as_deref(), Some("created_at"));
}

#[test]
fn test_incremental_without_keys_runs_full_table() {
    let e = entry(
        "users",
        json!([{"breadcrumb": [], "metadata": {
            "selected": true,
            "replication-method": "INCREMENTAL"
        }}]),
    );
    let run = resolve_entry(&e).unwrap().run;
    assert!(!run.is_incremental());
    assert!(run.replication_key.is_none());
}

#[test]
fn test_entry_level_replication_method() {
    let mut e = entry("severities", json!([{"breadcrumb": [], "metadata": {"selected": true}}]));
    e.replication_method = Some("incremental".to_string());
    assert!(resolve_entry(&e).unwrap().run.is_incremental());
}

#[test]
fn test_unknown_stream_resolves_without_definition() {
    let e = entry("pagerduty_incidents", json!([{"breadcrumb": [], "metadata": {"selected": true}}]));
    let resolved = resolve_entry(&e).unwrap();
    assert!(resolved.selected);
    assert!(resolved.definition.is_none());
}

#[test]
fn test_resolve_without_catalog_selects_everything() {
    let resolved = resolve(None).unwrap();
    assert_eq!(resolved.len(), registry::all().len());
    assert!(resolved.iter().all(|s| s.selected));

    let incidents = resolved.iter().find(|s| s.tap_stream_id == "incidents").unwrap();
    assert!(incidents.fields.contains("attachments"));
    assert!(incidents.fields.contains("updates"));
    assert!(!incidents.run.is_incremental());
}

#[test]
fn test_missing_schema_uses_embedded() {
    let e: CatalogEntry = serde_json::from_value(json!({
        "tap_stream_id": "users",
        "metadata": [{"breadcrumb": [], "metadata": {"selected": true}}]
    }))
    .unwrap();
    let resolved = resolve_entry(&e).unwrap();
    assert_eq!(
        sorted(&resolved.fields),
        vec!["email", "id", "name", "slack_user_id"]
    );
}

#[test]
fn test_catalog_from_json_errors() {
    let err = Catalog::from_json("not json").unwrap_err();
    assert!(matches!(err, crate::error::Error::Catalog { .. }));
    assert!(Catalog::from_file("/nonexistent/catalog.json").is_err());
}

#[test]
fn test_stream_metadata_mut_creates_entry() {
    let mut e = entry("severities", json!([]));
    e.stream_metadata_mut().selected = Some(true);
    assert_eq!(e.metadata.len(), 1);
    assert!(resolve_entry(&e).unwrap().selected);
}
