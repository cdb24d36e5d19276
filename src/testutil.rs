//! Fixtures shared by the unit tests.

use anyhow::Result;
use std::{collections::HashMap, fs, io::Cursor, path::Path};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::load::{load_raw_table, read_csv, DATASETS};
use crate::store::Store;

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ridereport=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

const RIDES_HEADER: &str =
    "ride_id,rider_id,driver_id,pickup_city,dropoff_city,distance_km,pickup_time,status";
const RIDERS_HEADER: &str = "rider_id,name,signup_date";
const DRIVERS_HEADER: &str = "driver_id,name,rating";
const PAYMENTS_HEADER: &str = "payment_id,ride_id,amount,method,paid_date";

/// In-memory builder for the four raw CSV extracts.
#[derive(Default)]
pub struct Fixture {
    rides: Vec<String>,
    riders: Vec<String>,
    drivers: Vec<String>,
    payments: Vec<String>,
}

impl Fixture {
    pub fn rider(&mut self, id: i64, name: &str, signup_date: &str) -> &mut Self {
        self.riders.push(format!("{id},{name},{signup_date}"));
        self
    }

    pub fn driver(&mut self, id: i64, name: &str, rating: f64) -> &mut Self {
        self.drivers.push(format!("{id},{name},{rating}"));
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ride(
        &mut self,
        id: i64,
        rider_id: i64,
        driver_id: i64,
        city: &str,
        distance_km: f64,
        pickup_time: &str,
        status: &str,
    ) -> &mut Self {
        self.rides.push(format!(
            "{id},{rider_id},{driver_id},{city},Airport,{distance_km},{pickup_time},{status}"
        ));
        self
    }

    pub fn payment(
        &mut self,
        id: i64,
        ride_id: i64,
        amount: f64,
        method: &str,
        paid_date: &str,
    ) -> &mut Self {
        self.payments
            .push(format!("{id},{ride_id},{amount},{method},{paid_date}"));
        self
    }

    /// Append a row verbatim, for cells the typed builders cannot spell.
    pub fn raw_row(&mut self, table: &str, line: &str) -> &mut Self {
        let rows = match table {
            "rides_raw" => &mut self.rides,
            "riders_raw" => &mut self.riders,
            "drivers_raw" => &mut self.drivers,
            "payments_raw" => &mut self.payments,
            other => panic!("unknown fixture table {other}"),
        };
        rows.push(line.to_string());
        self
    }

    pub fn csv(&self, table: &str) -> String {
        let (header, rows) = match table {
            "rides_raw" => (RIDES_HEADER, &self.rides),
            "riders_raw" => (RIDERS_HEADER, &self.riders),
            "drivers_raw" => (DRIVERS_HEADER, &self.drivers),
            "payments_raw" => (PAYMENTS_HEADER, &self.payments),
            other => panic!("unknown fixture table {other}"),
        };
        let mut out = String::from(header);
        out.push('\n');
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    /// Write the four CSV files into `dir`; returns the data row count per table.
    pub fn write_to(&self, dir: &Path) -> Result<HashMap<&'static str, usize>> {
        let mut counts = HashMap::new();
        for dataset in DATASETS {
            let text = self.csv(dataset.table);
            fs::write(dir.join(dataset.file), &text)?;
            counts.insert(dataset.table, text.lines().count() - 1);
        }
        Ok(counts)
    }

    /// Load the four tables into a fresh in-memory store.
    pub fn store(&self) -> Result<Store> {
        let mut store = Store::open_in_memory()?;
        for dataset in DATASETS {
            let raw = read_csv(dataset.table, Cursor::new(self.csv(dataset.table)))?;
            load_raw_table(&mut store, dataset.table, &raw)?;
        }
        Ok(store)
    }
}

/// A small, realistic data set touching every report.
pub fn sample() -> Fixture {
    let mut f = Fixture::default();
    f.rider(1, "Amaka", "2021-02-11")
        .rider(2, "Bola", "2021-09-30")
        .rider(3, "Chidi", "2022-05-05");
    f.driver(10, "Musa", 4.9)
        .driver(11, "Ngozi", 4.6)
        .driver(12, "Tunde", 4.1);
    f.ride(100, 1, 10, "Lagos", 12.4, "2024-01-15 08:30:00", "completed")
        .ride(101, 1, 11, "Lagos", 3.2, "2023-11-02 19:05:00", "cancelled")
        .ride(102, 2, 10, "Abuja", 25.0, "2022-07-19 07:45:00", "completed")
        .ride(103, 3, 12, "Abuja", 8.8, "2024-03-01 12:00:00", "Cancelled")
        .ride(104, 2, 11, "Lagos", 17.1, "2021-08-08 22:10:00", "completed");
    f.payment(1000, 100, 5400.0, "card", "2024-01-15")
        .payment(1001, 102, 9100.5, "Cash", "2022-07-19")
        .payment(1002, 104, 7000.0, "wallet", "2021-08-09")
        .payment(1003, 101, 0.0, "card", "2023-11-02");
    f
}

/// Write the sample data set into `dir`.
pub fn write_fixture_dir(dir: &Path) -> Result<HashMap<&'static str, usize>> {
    sample().write_to(dir)
}
