//! Writing per-sample fit results as CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::SampleScore;

/// Write `altitude,density,density_fit,ratio` rows to `path`.
pub fn export_results(path: &Path, scores: &[SampleScore]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|err| AppError::io(format!("Cannot create {}: {err}", path.display())))?;
    write_results(file, scores)
        .map_err(|err| AppError::io(format!("Cannot write {}: {err}", path.display())))
}

/// Same as [`export_results`] but to any writer.
pub fn write_results<W: Write>(writer: W, scores: &[SampleScore]) -> Result<(), AppError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["altitude", "density", "density_fit", "ratio"])
        .map_err(|err| AppError::io(format!("Cannot write results header: {err}")))?;

    for score in scores {
        csv.write_record([
            score.sample.altitude.to_string(),
            score.sample.density.to_string(),
            score.fitted.to_string(),
            score.ratio.to_string(),
        ])
        .map_err(|err| AppError::io(format!("Cannot write results row: {err}")))?;
    }

    csv.flush()
        .map_err(|err| AppError::io(format!("Cannot flush results: {err}")))
}
