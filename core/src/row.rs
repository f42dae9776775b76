//! Row-to-JSON decoding for generic endpoints.
//!
//! Handlers never know column sets ahead of time, so rows are decoded
//! into JSON objects keyed on the declared MySQL column type. Values
//! that fail typed decode degrade to a string, then to null.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

/// Convert one result row into a JSON object.
pub fn row_to_json(row: &MySqlRow) -> Value {
    let mut obj = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let type_name = column.type_info().name();
        obj.insert(name, decode_column(row, idx, type_name));
    }
    Value::Object(obj)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    let value = match type_name {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(idx)
            .map(|v| v.map_or(Value::Null, Value::Bool)),
        n if n.ends_with("UNSIGNED") => row
            .try_get::<Option<u64>, _>(idx)
            .map(|v| v.map_or(Value::Null, |n| Value::Number(n.into()))),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(idx)
            .map(|v| v.map_or(Value::Null, |n| Value::Number(n.into()))),
        "FLOAT" => row
            .try_get::<Option<f32>, _>(idx)
            .map(|v| float_value(v.map(f64::from))),
        "DOUBLE" => row.try_get::<Option<f64>, _>(idx).map(float_value),
        // DECIMAL keeps its declared scale by rendering as a string,
        // the same shape the mysql2 driver hands to JS callers.
        "DECIMAL" => row
            .try_get::<Option<Decimal>, _>(idx)
            .map(|v| v.map_or(Value::Null, |d| Value::String(d.to_string()))),
        "TIMESTAMP" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)
            .map(|v| {
                v.map_or(Value::Null, |t| {
                    Value::String(t.format("%Y-%m-%d %H:%M:%S").to_string())
                })
            }),
        "DATETIME" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)
            .map(|v| {
                v.map_or(Value::Null, |t| {
                    Value::String(t.format("%Y-%m-%d %H:%M:%S").to_string())
                })
            }),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(idx)
            .map(|v| v.map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string()))),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)
            .map(|v| v.map_or(Value::Null, |t| Value::String(t.format("%H:%M:%S").to_string()))),
        _ => as_string(row, idx),
    };

    match value {
        Ok(v) => v,
        // Declared type and stored value disagree; fall back string-wards.
        Err(_) => as_string(row, idx).unwrap_or(Value::Null),
    }
}

fn as_string(row: &MySqlRow, idx: usize) -> Result<Value, sqlx::Error> {
    row.try_get::<Option<String>, _>(idx)
        .map(|v| v.map_or(Value::Null, Value::String))
}

fn float_value(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
