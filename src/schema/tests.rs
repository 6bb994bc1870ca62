//! Schema tests

use super::*;
use crate::streams::registry;
use serde_json::json;
use std::collections::HashSet;

fn fields(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_every_registered_stream_has_a_schema() {
    for def in registry::all() {
        let schema = load_schema(def.name).unwrap();
        assert!(
            !schema.properties.is_empty(),
            "schema for {} has no properties",
            def.name
        );
        for key in def.key_properties {
            assert!(
                schema.get_property(key).is_some(),
                "{}: key property {key} missing from schema",
                def.name
            );
        }
        for key in def.valid_replication_keys {
            let prop = schema.get_property(key).unwrap();
            assert!(prop.is_date_time(), "{}.{key} is not date-time", def.name);
        }
    }
}

#[test]
fn test_unknown_stream_has_no_schema() {
    assert!(raw_schema("pagerduty").is_none());
    let err = schema_value("pagerduty").unwrap_err();
    assert!(err.to_string().contains("pagerduty"));
}

#[test]
fn test_typed_properties() {
    let schema = load_schema("incidents").unwrap();

    let id = schema.get_property("id").unwrap();
    assert_eq!(id.primary_type(), Some(JsonType::String));
    assert!(!id.json_type.as_ref().unwrap().is_nullable());

    let updated = schema.get_property("updated_at").unwrap();
    assert!(updated.is_date_time());

    let updates = schema.get_property("updates").unwrap();
    assert_eq!(updates.primary_type(), Some(JsonType::Array));
}

#[test]
fn test_nullable_union() {
    let prop: SchemaProperty =
        serde_json::from_value(json!({"type": ["null", "integer"]})).unwrap();
    let ty = prop.json_type.unwrap();
    assert!(ty.is_nullable());
    assert_eq!(ty.primary_type(), Some(JsonType::Integer));

    let untyped: SchemaProperty = serde_json::from_value(json!({})).unwrap();
    assert_eq!(untyped.primary_type(), None);
}

#[test]
fn test_project_record_keeps_order_and_drops_extras() {
    let record = json!({"id": "1", "name": "Sev 1", "rank": 3, "secret": true});
    let record = record.as_object().unwrap().clone();

    let projected = project_record(record, &fields(&["rank", "id", "missing"]));
    let keys: Vec<&str> = projected.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "rank"]);
}

#[test]
fn test_project_schema() {
    let schema = schema_value("severities").unwrap();
    let projected = project_schema(&schema, &fields(&["id", "updated_at"]));

    let props = projected["properties"].as_object().unwrap();
    assert_eq!(props.len(), 2);
    assert!(props.contains_key("id"));
    assert_eq!(projected["additionalProperties"], json!(false));
}
