// src/schema/types.rs

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Cell spellings read as missing values, on top of blank cells. Same set a
/// dataframe `read_csv` treats as NA by default.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True for blank cells and the missing-value markers.
pub fn is_missing(raw: &str) -> bool {
    let v = raw.trim();
    v.is_empty() || MISSING_MARKERS.contains(&v)
}

/// Storage affinity of a loaded column, ordered from narrowest to widest.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Affinity {
    Integer,
    Real,
    Text,
}

impl Affinity {
    /// Column type used in `CREATE TABLE`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Real => "REAL",
            Affinity::Text => "TEXT",
        }
    }

    /// Narrowest affinity that can hold a single non-empty cell.
    pub fn of_cell(raw: &str) -> Affinity {
        let v = raw.trim();
        if v.parse::<i64>().is_ok() {
            Affinity::Integer
        } else if v.parse::<f64>().is_ok() {
            Affinity::Real
        } else {
            Affinity::Text
        }
    }

    /// Convert a raw CSV cell into a store value of this affinity.
    ///
    /// Missing cells become NULL whatever the affinity. Text cells keep their
    /// original spelling, including surrounding whitespace.
    pub fn to_value(&self, raw: &str) -> Value {
        if is_missing(raw) {
            return Value::Null;
        }
        let v = raw.trim();
        match self {
            Affinity::Integer => match v.parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Text(raw.to_string()),
            },
            Affinity::Real => match v.parse::<f64>() {
                Ok(f) => Value::Real(f),
                Err(_) => Value::Text(raw.to_string()),
            },
            Affinity::Text => Value::Text(raw.to_string()),
        }
    }
}

/// A single column definition as inferred from a CSV header and its cells.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub name: String,
    pub affinity: Affinity,
}

impl Column {
    pub fn new(name: impl Into<String>, affinity: Affinity) -> Self {
        Self {
            name: name.into(),
            affinity,
        }
    }
}
