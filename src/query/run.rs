use anyhow::{Context, Result};
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};
use rusqlite::types::Value;
use tracing::{error, info, instrument, warn};

use super::batch::{empty_batch, rows_to_batch};
use super::Report;
use crate::step::Step;
use crate::store::Store;

/// A report's exported table plus how its query went.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub name: String,
    pub batch: RecordBatch,
    /// Row count on success.
    pub outcome: Step<usize>,
}

/// Run `sql` against the store and collect every row.
#[instrument(level = "debug", skip(store, sql))]
pub fn execute(store: &Store, sql: &str) -> Result<RecordBatch> {
    let mut stmt = store
        .connection()
        .prepare(sql)
        .context("preparing query")?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut cursor = stmt.query([]).context("executing query")?;
    while let Some(row) = cursor.next().context("fetching row")? {
        let mut record = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            record.push(row.get::<_, Value>(idx)?);
        }
        rows.push(record);
    }

    rows_to_batch(&columns, &rows)
}

/// Render the first `limit` rows as a text table.
pub fn preview(batch: &RecordBatch, limit: usize) -> Result<String> {
    let head = batch.slice(0, limit.min(batch.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}

/// Run one report, print its preview, and substitute an empty table on failure.
pub fn run_report(store: &Store, report: &Report, preview_rows: usize) -> ReportResult {
    println!("\n{}\n{}\n{}", "=".repeat(70), report.name, "=".repeat(70));

    match execute(store, report.sql) {
        Ok(batch) => {
            match preview(&batch, preview_rows) {
                Ok(table) => println!("{table}"),
                Err(e) => warn!(report = report.name, "could not render preview: {:#}", e),
            }
            println!("→ {} rows total\n", batch.num_rows());
            info!(report = report.name, rows = batch.num_rows(), "report ready");
            ReportResult {
                name: report.name.to_string(),
                outcome: Step::Done(batch.num_rows()),
                batch,
            }
        }
        Err(e) => {
            error!(report = report.name, "query failed: {:#}", e);
            ReportResult {
                name: report.name.to_string(),
                batch: empty_batch(),
                outcome: Step::Failed {
                    reason: format!("{e:#}"),
                },
            }
        }
    }
}

/// Run every report in order; a failing query never stops the others.
pub fn run_all(store: &Store, reports: &[Report], preview_rows: usize) -> Vec<ReportResult> {
    let results: Vec<ReportResult> = reports
        .iter()
        .map(|r| run_report(store, r, preview_rows))
        .collect();

    let failed = results.iter().filter(|r| !r.outcome.is_done()).count();
    if failed > 0 {
        warn!("{} of {} reports failed and will export empty", failed, results.len());
    } else {
        info!("all {} reports ran", results.len());
    }
    results
}
