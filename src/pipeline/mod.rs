// src/pipeline/mod.rs

pub mod summary;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::export::{self, ExportSummary};
use crate::load::{self, LoadOutcome};
use crate::query::{self, Report, ReportResult};
use crate::step::Step;
use crate::store::Store;

pub use summary::write_summary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub name: String,
    /// Row count on success.
    pub result: Step<usize>,
}

impl From<&ReportResult> for ReportOutcome {
    fn from(r: &ReportResult) -> Self {
        Self {
            name: r.name.clone(),
            result: r.outcome.clone(),
        }
    }
}

/// What happened during one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub database: PathBuf,
    pub loads: Vec<LoadOutcome>,
    pub reports: Vec<ReportOutcome>,
    /// `None` when there were no reports to export.
    pub export: Option<Step<ExportSummary>>,
}

/// Run the full pipeline with the built-in report catalog.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    run_with_catalog(config, query::catalog())
}

/// Open store → load datasets → run reports → export → close store.
///
/// Only a store that cannot be opened is an error; every later failure is
/// logged, recorded in the summary, and the run carries on.
pub fn run_with_catalog(config: &PipelineConfig, reports: &[Report]) -> Result<RunSummary> {
    let started_at = Utc::now();
    info!("startup");

    // ─── 1) open store ───────────────────────────────────────────────
    let mut store = Store::open(&config.database).context("opening report store")?;
    info!("connected to SQLite store {}", store.location());

    // ─── 2) load datasets ────────────────────────────────────────────
    let loads = load::load_all(&mut store, &config.data_dir);

    // ─── 3) run reports + export ─────────────────────────────────────
    let (reports, export) = if reports.is_empty() {
        warn!("no reports defined; skipping queries and export");
        (Vec::new(), None)
    } else {
        info!("{} reports ready", reports.len());
        let results = query::run_all(&store, reports, config.preview_rows);
        let export = export_step(config, &results);
        (results.iter().map(ReportOutcome::from).collect(), Some(export))
    };

    // ─── 4) release store ────────────────────────────────────────────
    if let Err(e) = store.close() {
        debug!("ignoring error while closing store: {:#}", e);
    }

    let summary = RunSummary {
        started_at,
        finished_at: Utc::now(),
        database: config.database.clone(),
        loads,
        reports,
        export,
    };

    if let Some(path) = &config.summary {
        match write_summary(path, &summary) {
            Ok(()) => info!("wrote run summary to {}", path.display()),
            Err(e) => warn!("could not write run summary: {:#}", e),
        }
    }

    info!("task finished");
    Ok(summary)
}

fn export_step(config: &PipelineConfig, results: &[ReportResult]) -> Step<ExportSummary> {
    let result = export::write_workbook(&config.workbook, results);
    if let Err(e) = &result {
        error!(path = %config.workbook.display(), "export failed: {:#}", e);
    }
    Step::from_result(result)
}
