//! Report export (CSV or JSON, chosen by file suffix) and re-import.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use tracing::info;
#[cfg(feature = "profile")]
use tracing::{error, warn};

use crate::entry::{sort_by_cost, ProfileEntry};
use crate::error::{ProfileError, Result};

/// Column header of CSV reports.
pub const CSV_HEADER: [&str; 5] = [
    "name",
    "calls",
    "total_seconds",
    "avg_seconds",
    "total_bytes",
];

/// On-disk report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// `name,calls,total_seconds,avg_seconds,total_bytes` rows.
    Csv,
    /// Array of objects; `total_bytes` only when nonzero.
    Json,
}

impl ReportFormat {
    /// `.json` selects JSON; any other suffix, or none, selects CSV.
    pub fn from_path(path: &Path) -> Self {
        let is_json = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(".json"));
        if is_json {
            ReportFormat::Json
        } else {
            ReportFormat::Csv
        }
    }
}

/// Writes `entries` to `path`, logging instead of failing.
///
/// An empty slice produces a warning and no file; an unwritable path
/// produces an error log and no file. Never panics.
#[cfg(feature = "profile")]
pub fn dump(entries: &[ProfileEntry], path: impl AsRef<Path>) {
    let path = path.as_ref();
    match try_dump(entries, path) {
        Ok(_) => info!(path = %path.display(), regions = entries.len(), "profile written"),
        Err(ProfileError::Empty) => {
            warn!(path = %path.display(), "no profiling data collected; report not written")
        }
        Err(err) => error!(path = %path.display(), error = %err, "could not write profile report"),
    }
}

/// Inert when `profile` is disabled: no file operation, no diagnostics.
#[cfg(not(feature = "profile"))]
#[inline(always)]
pub fn dump(_entries: &[ProfileEntry], _path: impl AsRef<Path>) {}

/// Writes `entries` to `path` in the format its suffix selects.
///
/// Entries are written in the order given. A file left half-written by a
/// failing writer is removed.
pub fn try_dump(entries: &[ProfileEntry], path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if entries.is_empty() {
        return Err(ProfileError::Empty);
    }
    let file = File::create(path).map_err(|source| ProfileError::open(path, source))?;
    let mut out = BufWriter::new(file);
    let written = match ReportFormat::from_path(path) {
        ReportFormat::Csv => write_csv(&mut out, entries),
        ReportFormat::Json => write_json(&mut out, entries),
    }
    .and_then(|()| out.flush().map_err(ProfileError::from));
    if let Err(err) = written {
        drop(out);
        let _ = fs::remove_file(path);
        return Err(err);
    }
    Ok(path.to_path_buf())
}

/// CSV rows with seconds fixed at six decimals.
pub fn write_csv<W: Write>(out: W, entries: &[ProfileEntry]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for entry in entries {
        writer.write_record(&[
            entry.name.clone(),
            entry.calls.to_string(),
            format!("{:.6}", entry.total_seconds),
            format!("{:.6}", entry.avg_seconds()),
            entry.total_bytes.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// JSON array, one object per entry, seconds fixed at six decimals.
pub fn write_json<W: Write>(mut out: W, entries: &[ProfileEntry]) -> Result<()> {
    writeln!(out, "[")?;
    for (idx, entry) in entries.iter().enumerate() {
        writeln!(out, "  {{")?;
        writeln!(out, "    \"name\": {},", serde_json::to_string(&entry.name)?)?;
        writeln!(out, "    \"calls\": {},", entry.calls)?;
        write!(out, "    \"total_seconds\": {:.6}", entry.total_seconds)?;
        if entry.total_bytes > 0 {
            write!(out, ",\n    \"total_bytes\": {}", entry.total_bytes)?;
        }
        write!(out, "\n  }}")?;
        if idx + 1 < entries.len() {
            write!(out, ",")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "]")?;
    Ok(())
}

#[derive(Deserialize)]
struct ReportRow {
    name: String,
    calls: u64,
    total_seconds: f64,
    #[serde(default)]
    total_bytes: u64,
}

/// Reads a report produced by [`try_dump`], sorted by total seconds.
///
/// `avg_seconds` is recomputed rather than read back.
pub fn read_report(path: impl AsRef<Path>) -> Result<Vec<ProfileEntry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ProfileError::open(path, source))?;
    let rows: Vec<ReportRow> = match ReportFormat::from_path(path) {
        ReportFormat::Csv => {
            let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
            reader
                .deserialize()
                .collect::<std::result::Result<Vec<ReportRow>, csv::Error>>()?
        }
        ReportFormat::Json => serde_json::from_reader(BufReader::new(file))?,
    };
    let mut entries = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        if !row.total_seconds.is_finite() || row.total_seconds < 0.0 {
            return Err(ProfileError::Parse {
                path: path.to_path_buf(),
                line: idx as u64 + 1,
                message: format!("total_seconds {} is not a non-negative number", row.total_seconds),
            });
        }
        entries.push(ProfileEntry::new(
            row.name,
            row.calls,
            row.total_seconds,
            row.total_bytes,
        ));
    }
    sort_by_cost(&mut entries);
    Ok(entries)
}

/// Logs the `top` most expensive regions at `info`.
pub fn log_summary(entries: &[ProfileEntry], top: usize) {
    for entry in entries.iter().take(top) {
        info!(
            region = %entry.name,
            calls = entry.calls,
            total_seconds = entry.total_seconds,
            avg_seconds = entry.avg_seconds(),
            total_bytes = entry.total_bytes,
            "profile region"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProfileEntry> {
        vec![
            ProfileEntry::new("gemm", 4, 2.0, 0),
            ProfileEntry::new("read_bed", 0, 0.0, 4096),
        ]
    }

    #[test]
    fn format_follows_suffix() {
        assert_eq!(ReportFormat::from_path(Path::new("out.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("out.csv")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_path(Path::new("out.dat")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_path(Path::new("out")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_path(Path::new("out.JSON")), ReportFormat::Csv);
        assert_eq!(ReportFormat::from_path(Path::new("out.json.bak")), ReportFormat::Csv);
    }

    #[test]
    fn csv_layout() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "name,calls,total_seconds,avg_seconds,total_bytes\n\
             gemm,4,2.000000,0.500000,0\n\
             read_bed,0,0.000000,0.000000,4096\n"
        );
    }

    #[test]
    fn json_layout() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "[\n  {\n    \"name\": \"gemm\",\n    \"calls\": 4,\n    \"total_seconds\": 2.000000\n  },\n  \
             {\n    \"name\": \"read_bed\",\n    \"calls\": 0,\n    \"total_seconds\": 0.000000,\n    \
             \"total_bytes\": 4096\n  }\n]\n"
        );
    }

    #[test]
    fn json_escapes_names() {
        let mut buf = Vec::new();
        write_json(&mut buf, &[ProfileEntry::new("a \"quoted\" region", 1, 0.5, 0)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["name"], "a \"quoted\" region");
    }

    #[test]
    fn empty_entries_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert!(matches!(try_dump(&[], &path), Err(ProfileError::Empty)));
        assert!(!path.exists());
    }
}
