//! PostgreSQL row decoding into raw JSON rows.

use palaver_storage::{Row, StorageError, StorageResult};
use serde_json::Value;
use sqlx_core::column::Column;
use sqlx_core::row::Row as SqlxRow;
use sqlx_core::type_info::TypeInfo;
use sqlx_postgres::PgRow;

/// Converts one PostgreSQL row into the raw column-name-to-value shape the
/// cache mirror stores.
///
/// Timestamps decode to epoch seconds, matching the storage convention for
/// the board's time columns; JSON columns come through as structured values.
pub fn row_to_raw(row: &PgRow) -> StorageResult<Row> {
    let mut raw = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column.type_info().name())
            .map_err(|e| StorageError::decode(format!("column `{}`: {e}", column.name())))?;
        raw.set(column.name().to_string(), value);
    }
    Ok(raw)
}

fn decode_column(
    row: &PgRow,
    index: usize,
    type_name: &str,
) -> Result<Value, sqlx_core::error::Error> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(Value::from),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map(|v| Value::from(i64::from(v))),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map(|v| Value::from(i64::from(v))),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|v| Value::from(f64::from(v))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(Value::from),
        "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(index)?,
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)?
            .map(|v| Value::from(v.timestamp())),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)?
            .map(|v| Value::from(v.and_utc().timestamp())),
        // TEXT, VARCHAR, BPCHAR, NAME and anything else textual.
        _ => row.try_get::<Option<String>, _>(index)?.map(Value::from),
    };
    Ok(value.unwrap_or(Value::Null))
}
