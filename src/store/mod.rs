use anyhow::{Context, Result};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::schema::Column;

/// The SQLite store holding the raw tables for one run.
///
/// Dropping a `Store` closes the underlying connection; `close` does the same
/// but reports the error instead of discarding it.
pub struct Store {
    conn: Connection,
    location: String,
}

impl Store {
    /// Open a SQLite database on disk at `path`, creating the file if it doesn't exist.
    #[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening SQLite store {}", path.display()))?;
        let store = Self {
            conn,
            location: path.display().to_string(),
        };
        store.verify()?;
        Ok(store)
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory SQLite store")?;
        Ok(Self {
            conn,
            location: ":memory:".into(),
        })
    }

    // SQLite opens lazily; touching the schema surfaces unreadable or non-database files now.
    fn verify(&self) -> Result<()> {
        let tables: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sqlite_master;", [], |r| r.get(0))
            .with_context(|| format!("reading schema of {}", self.location))?;
        debug!(tables, "store opened");
        Ok(())
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop `table` if present, recreate it with `columns`, and insert `rows`,
    /// all in one transaction. Returns the number of rows inserted.
    #[instrument(level = "debug", skip(self, columns, rows), fields(store = %self.location))]
    pub fn replace_table<I>(&mut self, table: &str, columns: &[Column], rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let ident = quote_ident(table);
        let col_defs = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.affinity.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");

        let tx = self
            .conn
            .transaction()
            .with_context(|| format!("starting transaction for {}", table))?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {ident};\nCREATE TABLE {ident} ({col_defs});"
        ))
        .with_context(|| format!("recreating table {}", table))?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(&format!("INSERT INTO {ident} VALUES ({placeholders});"))
                .with_context(|| format!("preparing insert into {}", table))?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))
                    .with_context(|| format!("inserting row {} into {}", inserted + 1, table))?;
                inserted += 1;
            }
        }
        tx.commit()
            .with_context(|| format!("committing table {}", table))?;

        debug!(table, rows = inserted, "table replaced");
        Ok(inserted)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {};", quote_ident(table)),
                [],
                |r| r.get(0),
            )
            .with_context(|| format!("counting rows of {}", table))?;
        Ok(n as usize)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |r| r.get(0),
        )?;
        Ok(n > 0)
    }

    /// Close the connection, reporting any error from SQLite.
    pub fn close(self) -> Result<()> {
        let location = self.location;
        self.conn
            .close()
            .map_err(|(_, err)| anyhow::Error::new(err))
            .with_context(|| format!("closing store {}", location))?;
        info!(store = %location, "store closed");
        Ok(())
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
