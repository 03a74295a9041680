//! Reading `(altitude, density)` tables from CSV.
//!
//! Headers are matched after normalization (BOM stripped, lowercased,
//! leading `#` and unit suffixes like `[km]` removed), so `#alt[km]`,
//! `Altitude` and `rho` all resolve. Malformed rows are skipped and
//! reported, not fatal; a table with zero usable rows is.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::Sample;
use crate::error::AppError;

/// Outcome of reading one table.
#[derive(Debug)]
pub struct IngestReport {
    pub samples: Vec<Sample>,
    pub rows_read: usize,
    /// One message per skipped row, in file order.
    pub skipped: Vec<String>,
}

/// Open `path` and parse it as a sample table.
pub fn load_samples(path: &Path) -> Result<IngestReport, AppError> {
    let file = File::open(path)
        .map_err(|err| AppError::io(format!("Cannot open {}: {err}", path.display())))?;
    read_samples(file)
        .map_err(|err| AppError::new(err.kind(), format!("{}: {}", path.display(), err)))
}

/// Parse a sample table from any reader.
pub fn read_samples<R: Read>(reader: R) -> Result<IngestReport, AppError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|err| AppError::io(format!("Cannot read table header: {err}")))?
        .clone();

    let mut alt_col = None;
    let mut density_col = None;
    for (idx, raw) in headers.iter().enumerate() {
        match classify_header(raw) {
            Some(Column::Altitude) if alt_col.is_none() => alt_col = Some(idx),
            Some(Column::Density) if density_col.is_none() => density_col = Some(idx),
            _ => {}
        }
    }

    let (alt_col, density_col) = match (alt_col, density_col) {
        (Some(a), Some(d)) => (a, d),
        _ => {
            return Err(AppError::config(format!(
                "Table needs an altitude and a density column; found headers: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            )));
        }
    };

    let mut samples = Vec::new();
    let mut skipped = Vec::new();
    let mut rows_read = 0usize;

    for (row_idx, record) in csv.records().enumerate() {
        rows_read += 1;
        let line = row_idx + 2; // header is line 1

        let record = match record {
            Ok(r) => r,
            Err(err) => {
                skipped.push(format!("line {line}: {err}"));
                continue;
            }
        };

        let altitude = match parse_field(&record, alt_col) {
            Ok(v) => v,
            Err(msg) => {
                skipped.push(format!("line {line}: altitude {msg}"));
                continue;
            }
        };
        let density = match parse_field(&record, density_col) {
            Ok(v) => v,
            Err(msg) => {
                skipped.push(format!("line {line}: density {msg}"));
                continue;
            }
        };

        if density <= 0.0 {
            skipped.push(format!("line {line}: density {density} is not positive"));
            continue;
        }

        samples.push(Sample { altitude, density });
    }

    if samples.is_empty() {
        return Err(AppError::insufficient_data(format!(
            "Table has no usable rows ({rows_read} read, {} skipped).",
            skipped.len()
        )));
    }

    Ok(IngestReport { samples, rows_read, skipped })
}

enum Column {
    Altitude,
    Density,
}

fn classify_header(raw: &str) -> Option<Column> {
    let name = normalize_header(raw);
    if matches!(name.as_str(), "altitude" | "alt" | "height" | "h") {
        Some(Column::Altitude)
    } else if name == "density" || name.starts_with("rho") || name.starts_with("dens") {
        Some(Column::Density)
    } else {
        None
    }
}

fn normalize_header(raw: &str) -> String {
    let name = raw.trim().trim_start_matches('\u{feff}').trim_start_matches('#');
    let name = name.split('[').next().unwrap_or(name);
    name.trim().to_ascii_lowercase()
}

fn parse_field(record: &csv::StringRecord, idx: usize) -> Result<f64, String> {
    let raw = record.get(idx).ok_or_else(|| "column missing".to_string())?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("value {raw:?} is not a number"))?;
    if !value.is_finite() {
        return Err(format!("value {raw:?} is not finite"));
    }
    Ok(value)
}
