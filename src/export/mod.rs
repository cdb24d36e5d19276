// src/export/mod.rs
use anyhow::{Context, Result};
use arrow::{
    array::{Array, Float64Array, Int64Array, StringArray},
    datatypes::DataType,
    record_batch::RecordBatch,
    util::display::array_value_to_string,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use serde::Serialize;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

use crate::query::ReportResult;

/// Longest sheet name a workbook accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Most characters a single cell holds; longer text is truncated.
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetName {
    pub report: String,
    pub sheet: String,
    /// Set when truncation collided with an earlier sheet and a suffix was added.
    pub renamed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub sheets: Vec<SheetName>,
}

pub fn truncate_sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Truncate every report name to a sheet name, keeping them unique.
///
/// Sheet names compare case-insensitively. When a truncated name is already
/// taken, its tail is replaced with `~N` (N = 2, 3, …) and a warning is logged.
pub fn assign_sheet_names<'a, I>(reports: I) -> Vec<SheetName>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for report in reports {
        let base = truncate_sheet_name(report);
        let mut sheet = base.clone();
        let mut n = 2;
        while taken.contains(&sheet.to_lowercase()) {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            sheet = report.chars().take(keep).collect::<String>() + &suffix;
            n += 1;
        }
        let renamed = sheet != base;
        if renamed {
            warn!(
                report,
                sheet = %sheet,
                "sheet name `{}` already used; writing to `{}` instead",
                base,
                sheet
            );
        }
        taken.insert(sheet.to_lowercase());
        out.push(SheetName {
            report: report.to_string(),
            sheet,
            renamed,
        });
    }

    out
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
}

fn cell_row(row: usize) -> Result<u32> {
    // row 0 holds the header
    u32::try_from(row + 1).context("too many rows for a worksheet")
}

fn write_text(
    worksheet: &mut Worksheet,
    sheet: &str,
    column: &str,
    row: usize,
    col: u16,
    text: &str,
) -> Result<()> {
    let r = cell_row(row)?;
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                sheet,
                column,
                row = r + 1,
                "cell has {} characters; truncating to {}",
                text.chars().count(),
                MAX_CELL_CHARS
            );
            worksheet.write_string(r, col, &text[..cut])?;
        }
        None => {
            worksheet.write_string(r, col, text)?;
        }
    }
    Ok(())
}

/// Write `batch` to the sheet named `sheet` with a header row and no index
/// column. NULLs stay blank.
pub fn write_sheet(worksheet: &mut Worksheet, sheet: &str, batch: &RecordBatch) -> Result<()> {
    let header = header_format();
    let schema = batch.schema();

    for (c, field) in schema.fields().iter().enumerate() {
        let col = u16::try_from(c).context("too many columns for a worksheet")?;
        worksheet.write_string_with_format(0, col, field.name(), &header)?;

        let array = batch.column(c);
        match field.data_type() {
            DataType::Int64 => {
                let values = array
                    .as_any()
                    .downcast_ref::<Int64Array>()
                    .context("int64 column")?;
                for (r, v) in values.iter().enumerate() {
                    if let Some(v) = v {
                        worksheet.write_number(cell_row(r)?, col, v as f64)?;
                    }
                }
            }
            DataType::Float64 => {
                let values = array
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .context("float64 column")?;
                for (r, v) in values.iter().enumerate() {
                    match v {
                        Some(v) if v.is_finite() => {
                            worksheet.write_number(cell_row(r)?, col, v)?;
                        }
                        Some(v) => {
                            worksheet.write_string(cell_row(r)?, col, v.to_string())?;
                        }
                        None => {}
                    }
                }
            }
            DataType::Utf8 => {
                let values = array
                    .as_any()
                    .downcast_ref::<StringArray>()
                    .context("utf8 column")?;
                for (r, v) in values.iter().enumerate() {
                    if let Some(v) = v {
                        write_text(worksheet, sheet, field.name(), r, col, v)?;
                    }
                }
            }
            _ => {
                for r in 0..array.len() {
                    if array.is_valid(r) {
                        let text = array_value_to_string(array.as_ref(), r)?;
                        write_text(worksheet, sheet, field.name(), r, col, &text)?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Write one sheet per report into a new workbook at `path`.
#[instrument(level = "info", skip(path, results), fields(path = %path.display(), reports = results.len()))]
pub fn write_workbook(path: &Path, results: &[ReportResult]) -> Result<ExportSummary> {
    let sheets = assign_sheet_names(results.iter().map(|r| r.name.as_str()));
    let mut workbook = Workbook::new();

    for (result, name) in results.iter().zip(&sheets) {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name.sheet.as_str())
            .with_context(|| format!("naming sheet `{}`", name.sheet))?;
        write_sheet(worksheet, &name.sheet, &result.batch)
            .with_context(|| format!("writing sheet `{}`", name.sheet))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving workbook {}", path.display()))?;
    info!("wrote {} sheets to {}", sheets.len(), path.display());

    Ok(ExportSummary {
        path: path.to_path_buf(),
        sheets,
    })
}
