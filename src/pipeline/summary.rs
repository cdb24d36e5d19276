use anyhow::{Context, Result};
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use super::RunSummary;

/// Write `summary` as pretty JSON to `path`.
///
/// The JSON goes to a hidden temp file next to `path` first and is renamed
/// over it, so readers never see a half-written summary.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("summary path {} has no file name", path.display()))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    {
        let file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        let mut out = BufWriter::new(file);
        // pretty-print with a trailing newline
        serde_json::to_writer_pretty(&mut out, summary).context("serializing run summary")?;
        out.write_all(b"\n")?;
        out.flush()?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    Ok(())
}
