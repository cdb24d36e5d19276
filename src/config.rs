use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATABASE: &str = "hng_ride.db";
pub const DEFAULT_WORKBOOK: &str = "HNG_Ride_Analysis.xlsx";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load the ride-hailing CSV extracts into SQLite, run the business reports and export them to Excel"
)]
pub struct Args {
    /// Directory holding rides_raw.csv, riders_raw.csv, drivers_raw.csv and payments_raw.csv
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,
    /// SQLite store file; its raw tables are replaced on every run
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,
    /// Workbook to write, one sheet per report
    #[arg(short, long, default_value = DEFAULT_WORKBOOK)]
    pub output: PathBuf,
    /// Rows shown in each report's console preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
    /// Also write a JSON summary of the run to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub workbook: PathBuf,
    pub preview_rows: usize,
    pub summary: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            database: PathBuf::from(DEFAULT_DATABASE),
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            summary: None,
        }
    }
}

impl From<Args> for PipelineConfig {
    fn from(args: Args) -> Self {
        Self {
            data_dir: args.data_dir,
            database: args.database,
            workbook: args.output,
            preview_rows: args.preview_rows,
            summary: args.summary,
        }
    }
}
