//! JSON schema to Arrow conversion
//!
//! Column types come from the declared JSON schema of a stream, never from
//! the data, so every file of a stream has the same layout.

use crate::cursor::parse_timestamp;
use crate::error::{Error, Result};
use crate::schema::{JsonType, SchemaProperty};
use crate::types::Record;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::sync::Arc;

const UTC: &str = "UTC";

/// Arrow type for one JSON schema property
pub fn property_type(property: &Value) -> DataType {
    let Ok(property) = serde_json::from_value::<SchemaProperty>(property.clone()) else {
        return DataType::Utf8;
    };
    if property.is_date_time() {
        return DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into()));
    }

    match property.primary_type() {
        Some(JsonType::Integer) => DataType::Int64,
        Some(JsonType::Number) => DataType::Float64,
        Some(JsonType::Boolean) => DataType::Boolean,
        // strings, objects, arrays and untyped values are kept as JSON text
        _ => DataType::Utf8,
    }
}

/// Arrow schema for a stream's JSON schema
///
/// Column order follows the order of `properties`. All columns are nullable.
pub fn arrow_schema(json_schema: &Value) -> Result<Schema> {
    let properties = json_schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::output("JSON schema has no properties"))?;

    let fields: Vec<Field> = properties
        .iter()
        .map(|(name, property)| Field::new(name, property_type(property), true))
        .collect();

    Ok(Schema::new(fields))
}

/// Convert records to a RecordBatch with the given schema
///
/// Record fields absent from the schema are dropped; schema columns absent
/// from a record are null.
pub fn records_to_batch(records: &[Record], schema: &Arc<Schema>) -> Result<RecordBatch> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&Value>> = records
                .iter()
                .map(|r| r.get(field.name()).filter(|v| !v.is_null()))
                .collect();
            build_array(&values, field.data_type())
        })
        .collect::<Result<Vec<ArrayRef>>>()?;

    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let arr: TimestampMicrosecondArray = values
                .iter()
                .map(|v| {
                    v.and_then(Value::as_str)
                        .and_then(parse_timestamp)
                        .map(|at| at.timestamp_micros())
                })
                .collect();
            Ok(Arc::new(arr.with_timezone(UTC)))
        }

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }
    }
}
