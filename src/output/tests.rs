//! Tests for output module

use super::*;
use arrow::array::{Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs::File;
use std::sync::Arc;
use tempfile::tempdir;

fn record(value: Value) -> crate::types::Record {
    value.as_object().unwrap().clone()
}

fn severities_schema() -> Value {
    json!({
        "type": ["object"],
        "properties": {
            "id": {"type": ["string"]},
            "rank": {"type": ["null", "integer"]},
            "updated_at": {"type": ["string"], "format": "date-time"},
            "tags": {"type": ["null", "array"], "items": {"type": "string"}}
        }
    })
}

// ============================================================================
// Message Tests
// ============================================================================

#[test]
fn test_record_message_shape() {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let msg = Message::record("users", record(json!({"id": "u1"})), at);

    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({
            "type": "RECORD",
            "stream": "users",
            "record": {"id": "u1"},
            "time_extracted": "2024-01-02T03:04:05.000000Z"
        })
    );
}

#[test]
fn test_schema_message_omits_empty_bookmarks() {
    let msg = Message::schema("users", json!({}), vec!["id".into()], vec![]);
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["type"], "SCHEMA");
    assert_eq!(value["key_properties"], json!(["id"]));
    assert!(value.get("bookmark_properties").is_none());

    let msg = Message::schema("alerts", json!({}), vec!["id".into()], vec!["created_at".into()]);
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["bookmark_properties"], json!(["created_at"]));
}

#[test]
fn test_state_message_parses_back() {
    let line = r#"{"type":"STATE","value":{"bookmarks":{"alerts":{"created_at":"2024-01-01T00:00:00Z"}}}}"#;
    let msg: Message = serde_json::from_str(line).unwrap();
    assert!(msg.is_state());
    assert_eq!(msg.stream(), None);
}

// ============================================================================
// Sink Tests
// ============================================================================

#[test]
fn test_json_lines_sink() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.write(&Message::schema("users", json!({}), vec!["id".into()], vec![]))
        .unwrap();
    sink.write(&Message::state(json!({"bookmarks": {}}))).unwrap();
    sink.finish().unwrap();

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(r#"{"type":"SCHEMA""#));
    assert_eq!(lines[1], r#"{"type":"STATE","value":{"bookmarks":{}}}"#);
}

#[test]
fn test_memory_sink_helpers() {
    let at = Utc::now();
    let mut sink = MemorySink::new();
    sink.write(&Message::record("a", record(json!({"id": 1})), at)).unwrap();
    sink.write(&Message::record("b", record(json!({"id": 2})), at)).unwrap();
    sink.write(&Message::state(json!({"bookmarks": {}}))).unwrap();

    assert_eq!(sink.messages().len(), 3);
    assert_eq!(sink.records("a").len(), 1);
    assert_eq!(sink.states(), vec![&json!({"bookmarks": {}})]);
    assert!(!sink.is_finished());
    sink.finish().unwrap();
    assert!(sink.is_finished());
}

#[test]
fn test_fanout_writes_everywhere() {
    let dir = tempdir().unwrap();
    let mut fanout = FanoutSink::new()
        .with(JsonLinesSink::new(Vec::new()))
        .with(ParquetSink::new(dir.path()).unwrap());
    assert_eq!(fanout.len(), 2);

    fanout
        .write(&Message::schema("severities", severities_schema(), vec!["id".into()], vec![]))
        .unwrap();
    fanout.finish().unwrap();

    assert!(dir.path().join("severities.parquet").exists());
}

// ============================================================================
// Arrow Conversion Tests
// ============================================================================

#[test]
fn test_arrow_schema_types() {
    let schema = arrow_schema(&severities_schema()).unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["id", "rank", "updated_at", "tags"]);

    assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(
        schema.field(2).data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
    );
    assert_eq!(schema.field(3).data_type(), &DataType::Utf8);
}

#[test]
fn test_property_type_fallbacks() {
    assert_eq!(property_type(&json!({})), DataType::Utf8);
    assert_eq!(property_type(&json!({"type": "number"})), DataType::Float64);
    assert_eq!(property_type(&json!({"type": ["null", "boolean"]})), DataType::Boolean);
    assert_eq!(property_type(&json!({"type": ["object"]})), DataType::Utf8);
}

#[test]
fn test_records_to_batch() {
    let schema = Arc::new(arrow_schema(&severities_schema()).unwrap());
    let records = vec![
        record(json!({
            "id": "s1",
            "rank": 1,
            "updated_at": "2024-01-01T00:00:00Z",
            "tags": ["a", "b"],
            "extra": true
        })),
        record(json!({"id": "s2", "rank": null, "updated_at": "not a time"})),
    ];

    let batch = records_to_batch(&records, &schema).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 4);

    let rank = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
    assert_eq!(rank.value(0), 1);
    assert!(rank.is_null(1));

    let updated = batch
        .column(2)
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .unwrap();
    assert_eq!(updated.value(0), 1_704_067_200_000_000);
    assert!(updated.is_null(1));

    let tags = batch.column(3).as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(tags.value(0), r#"["a","b"]"#);
    assert!(tags.is_null(1));
}

// ============================================================================
// Parquet Tests
// ============================================================================

#[test]
fn test_parquet_sink_writes_file_per_stream() {
    let dir = tempdir().unwrap();
    let config = ParquetWriterConfig::new().with_batch_size(2);
    let mut sink = ParquetSink::with_config(dir.path(), config).unwrap();
    let at = Utc::now();

    sink.write(&Message::schema("severities", severities_schema(), vec!["id".into()], vec![]))
        .unwrap();
    for i in 0..5 {
        sink.write(&Message::record(
            "severities",
            record(json!({"id": format!("s{i}"), "rank": i})),
            at,
        ))
        .unwrap();
    }
    sink.write(&Message::state(json!({"bookmarks": {}}))).unwrap();
    sink.write(&Message::schema("users", json!({"properties": {"id": {"type": "string"}}}), vec![], vec![]))
        .unwrap();
    sink.finish().unwrap();

    let file = File::open(sink.path_for("severities")).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
    assert_eq!(rows, 5);

    assert!(sink.path_for("users").exists());
}

#[test]
fn test_parquet_sink_rejects_record_without_schema() {
    let dir = tempdir().unwrap();
    let mut sink = ParquetSink::new(dir.path()).unwrap();
    let result = sink.write(&Message::record("users", record(json!({"id": "u1"})), Utc::now()));
    assert!(result.is_err());
}
