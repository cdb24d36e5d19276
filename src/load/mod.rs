// src/load/mod.rs
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{error, info, instrument, warn};

use crate::schema::{derive_columns, Column};
use crate::step::Step;
use crate::store::Store;

/// One input file and the store table it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub file: &'static str,
    pub table: &'static str,
}

/// The four raw extracts, in load order.
pub const DATASETS: [Dataset; 4] = [
    Dataset {
        file: "rides_raw.csv",
        table: "rides_raw",
    },
    Dataset {
        file: "riders_raw.csv",
        table: "riders_raw",
    },
    Dataset {
        file: "drivers_raw.csv",
        table: "drivers_raw",
    },
    Dataset {
        file: "payments_raw.csv",
        table: "payments_raw",
    },
];

#[derive(Debug)]
pub struct RawTable {
    /// Column names, from the header row.
    pub headers: Vec<String>,
    /// Each data row, as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

/// What a successful load wrote to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedTable {
    pub rows: usize,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub table: String,
    pub file: PathBuf,
    pub result: Step<LoadedTable>,
}

/// Parse CSV text with a header row. `source` only labels errors.
pub fn read_csv<R: Read>(source: &str, reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", source))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", source, idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

pub fn read_csv_file(path: &Path) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_csv(&path.display().to_string(), BufReader::new(file))
}

/// Infer column types for `raw` and replace `table` with its rows.
pub fn load_raw_table(store: &mut Store, table: &str, raw: &RawTable) -> Result<LoadedTable> {
    let columns = derive_columns(table, &raw.headers, &raw.rows)?;
    let values = raw.rows.iter().map(|row| {
        columns
            .iter()
            .zip(row)
            .map(|(col, cell)| col.affinity.to_value(cell))
            .collect()
    });
    let rows = store.replace_table(table, &columns, values)?;
    Ok(LoadedTable { rows, columns })
}

/// Read one CSV file and replace `table` with its contents.
#[instrument(level = "info", skip(store, path), fields(path = %path.display()))]
pub fn load_dataset(store: &mut Store, path: &Path, table: &str) -> Result<LoadedTable> {
    let raw = read_csv_file(path)?;
    load_raw_table(store, table, &raw)
        .with_context(|| format!("loading {} into table {}", path.display(), table))
}

/// Load every dataset from `data_dir`. A failing file is logged and skipped;
/// the remaining files are still loaded.
pub fn load_all(store: &mut Store, data_dir: &Path) -> Vec<LoadOutcome> {
    let mut outcomes = Vec::with_capacity(DATASETS.len());

    for dataset in DATASETS {
        let path = data_dir.join(dataset.file);
        let result = load_dataset(store, &path, dataset.table);
        match &result {
            Ok(loaded) => info!(
                table = dataset.table,
                rows = loaded.rows,
                columns = loaded.columns.len(),
                "loaded {}",
                dataset.file
            ),
            Err(e) => error!(
                table = dataset.table,
                file = %path.display(),
                "load failed: {:#}",
                e
            ),
        }
        outcomes.push(LoadOutcome {
            table: dataset.table.to_string(),
            file: path,
            result: Step::from_result(result),
        });
    }

    let loaded = outcomes.iter().filter(|o| o.result.is_done()).count();
    if loaded == outcomes.len() {
        info!("all {} datasets loaded into {}", loaded, store.location());
    } else {
        warn!(
            "{} of {} datasets loaded into {}",
            loaded,
            outcomes.len(),
            store.location()
        );
    }

    outcomes
}
