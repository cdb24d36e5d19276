use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use rusqlite::types::Value;
use std::sync::Arc;

/// The result substituted for a report whose query failed: no columns, no rows.
pub fn empty_batch() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

/// Column type implied by the SQLite values of one result column:
///  - only integers (and NULLs) → Int64
///  - integers and reals → Float64
///  - anything else, or nothing but NULLs → Utf8
fn column_type<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut ty: Option<DataType> = None;
    for v in values {
        let next = match v {
            Value::Null => continue,
            Value::Integer(_) => DataType::Int64,
            Value::Real(_) => DataType::Float64,
            Value::Text(_) | Value::Blob(_) => return DataType::Utf8,
        };
        ty = match ty {
            Some(DataType::Float64) | Some(DataType::Int64) if next == DataType::Float64 => {
                Some(DataType::Float64)
            }
            Some(prev) => Some(prev),
            None => Some(next),
        };
    }
    ty.unwrap_or(DataType::Utf8)
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

fn build_column(rows: &[Vec<Value>], idx: usize) -> (DataType, ArrayRef) {
    let cells = || rows.iter().map(move |r| &r[idx]);
    match column_type(cells()) {
        DataType::Int64 => {
            let arr: Int64Array = cells()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            (DataType::Int64, Arc::new(arr) as ArrayRef)
        }
        DataType::Float64 => {
            let arr: Float64Array = cells()
                .map(|v| match v {
                    Value::Integer(i) => Some(*i as f64),
                    Value::Real(f) => Some(*f),
                    _ => None,
                })
                .collect();
            (DataType::Float64, Arc::new(arr) as ArrayRef)
        }
        _ => {
            let arr: StringArray = cells().map(as_text).collect();
            (DataType::Utf8, Arc::new(arr) as ArrayRef)
        }
    }
}

/// Convert rows fetched from SQLite into a single Arrow `RecordBatch`.
///
/// Every row must have exactly `columns.len()` values.
pub fn rows_to_batch(columns: &[String], rows: &[Vec<Value>]) -> Result<RecordBatch> {
    if columns.is_empty() {
        return Ok(empty_batch());
    }
    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != columns.len())
    {
        anyhow::bail!(
            "row {} has {} values, expected {}",
            i,
            row.len(),
            columns.len()
        );
    }

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());
    for (idx, name) in columns.iter().enumerate() {
        let (ty, arr) = build_column(rows, idx);
        fields.push(Field::new(name, ty, true));
        arrays.push(arr);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("assembling result batch")
}
