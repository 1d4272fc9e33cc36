//! Accessors for the flat positional row form of the domain records.
//!
//! A row is a JSON array whose positions follow the field order of the record.
//! Reads are total: a missing position, or a value of the wrong JSON type,
//! yields the caller's default.

use serde_json::Value;

pub(crate) fn string_at(row: &[Value], index: usize, default: &str) -> String {
    row.get(index)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

pub(crate) fn u64_at(row: &[Value], index: usize) -> u64 {
    row.get(index).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn u32_at(row: &[Value], index: usize) -> u32 {
    row.get(index)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

pub(crate) fn f64_at(row: &[Value], index: usize) -> f64 {
    row.get(index).and_then(Value::as_f64).unwrap_or(0.0)
}
