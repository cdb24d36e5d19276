use anyhow::{anyhow, Result};
use std::collections::HashSet;
use tracing::debug;

use super::{is_missing, Affinity, Column};

/// For each column, scan every row:
///  - Ignore blank cells and missing-value markers (`NA`, `null`, ...)
///  - Start from the affinity of the first non-blank cell
///  - Widen (INTEGER → REAL → TEXT) whenever a cell does not fit
///  - A column with no non-blank cells is REAL
pub fn derive_columns(
    table_name: &str,
    header_names: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<Column>> {
    if header_names.is_empty() {
        return Err(anyhow!("derive_columns: `{}` has no headers", table_name));
    }

    let mut seen = HashSet::with_capacity(header_names.len());
    let mut cols = Vec::with_capacity(header_names.len());

    for (idx, raw_name) in header_names.iter().enumerate() {
        let col_name = raw_name.trim();
        if col_name.is_empty() {
            return Err(anyhow!(
                "derive_columns: header at index {} in `{}` is empty after trimming",
                idx,
                table_name
            ));
        }
        if !seen.insert(col_name.to_ascii_lowercase()) {
            return Err(anyhow!(
                "derive_columns: duplicate header `{}` in `{}`",
                col_name,
                table_name
            ));
        }

        let mut affinity: Option<Affinity> = None;
        for row in rows {
            let cell = row.get(idx).map(|s| s.trim()).unwrap_or("");
            if is_missing(cell) {
                continue;
            }
            let inferred = Affinity::of_cell(cell);
            let widened = affinity.map_or(inferred, |prev| prev.max(inferred));
            affinity = Some(widened);
            if widened == Affinity::Text {
                break;
            }
        }

        let affinity = affinity.unwrap_or_else(|| {
            debug!(
                "derive_columns: no values for `{}` in `{}`, defaulting to REAL",
                col_name, table_name
            );
            Affinity::Real
        });

        cols.push(Column::new(col_name, affinity));
    }

    Ok(cols)
}
