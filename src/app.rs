//! Command dispatch and console output.
//!
//! Each subcommand handler stays thin: parse/convert arguments, call into
//! the pipeline, print. Everything testable lives below this layer.

pub mod pipeline;

use clap::Parser;

use crate::cli::{Cli, Command, CompareArgs, FitArgs, SampleArgs};
use crate::data::{export_table, synthesize, SyntheticSpec};
use crate::error::AppError;
use crate::io::{load_model, load_samples};
use crate::models::{Atmosphere, ReferenceModel};
use crate::report::format::{format_band_table, format_fit_lines, format_model_literal, format_run_summary};
use crate::report::score_bands;

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => run_fit(args),
        Command::Compare(args) => run_compare(args),
        Command::Sample(args) => run_sample(args),
    }
}

fn run_fit(args: FitArgs) -> Result<(), AppError> {
    let config = args.into_config();
    let output = pipeline::run_fit(&config)?;

    for msg in &output.skipped {
        eprintln!("warning: skipped {msg}");
    }

    print!("{}", format_fit_lines(&output.fits));
    println!("{}", format_model_literal(&output.model));
    println!(
        "{}",
        format_run_summary(output.rows_read, output.samples.len(), output.fits.len())
    );
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let report = load_samples(&args.table)?;
    for msg in &report.skipped {
        eprintln!("warning: skipped {msg}");
    }

    let bands = resolve_bands(&args.bands, &report.samples)?;

    let mut entries: Vec<(String, Atmosphere)> = Vec::new();
    let references = if args.models.is_empty() {
        vec![ReferenceModel::UsStd, ReferenceModel::Linsley]
    } else {
        args.models.clone()
    };
    for reference in references {
        entries.push((reference.display_name().to_string(), reference.build()));
    }
    if let Some(path) = &args.model_file {
        entries.push((path.display().to_string(), load_model(path)?));
    }

    for (name, model) in &entries {
        let scores = score_bands(model, &report.samples, &bands)?;
        print!("{}", format_band_table(name, &scores));
    }
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<(), AppError> {
    let model = args.model.build();
    let spec = SyntheticSpec {
        alt_min: args.alt_min,
        alt_max: args.alt_max,
        step: args.step,
        noise: args.noise,
        seed: args.seed,
    };

    let samples = synthesize(&model, &spec)?;
    export_table(&args.out, &samples)?;
    println!(
        "Wrote {} samples from the {} model to {}.",
        samples.len(),
        args.model.display_name(),
        args.out.display()
    );
    Ok(())
}

/// Turn the flat band-edge list into `(lower, upper)` pairs; with no edges
/// given, one band covering the whole table.
fn resolve_bands(edges: &[f64], samples: &[crate::domain::Sample]) -> Result<Vec<(f64, f64)>, AppError> {
    if edges.is_empty() {
        let lower = samples.iter().map(|s| s.altitude).fold(f64::INFINITY, f64::min);
        let upper = samples.iter().map(|s| s.altitude).fold(f64::NEG_INFINITY, f64::max);
        return Ok(vec![(lower, upper)]);
    }
    if edges.len() < 2 {
        return Err(AppError::config("Band list needs at least 2 edges."));
    }
    for pair in edges.windows(2) {
        if pair[1] <= pair[0] {
            return Err(AppError::config(format!(
                "Band edges must be strictly increasing: {} then {}.",
                pair[0], pair[1]
            )));
        }
    }
    Ok(edges.windows(2).map(|pair| (pair[0], pair[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sample;
    use crate::error::ErrorKind;

    #[test]
    fn missing_band_edges_cover_the_whole_table() {
        let samples = vec![
            Sample { altitude: -1.0, density: 1.3 },
            Sample { altitude: 50.0, density: 1e-3 },
        ];
        let bands = resolve_bands(&[], &samples).unwrap();
        assert_eq!(bands, vec![(-1.0, 50.0)]);
    }

    #[test]
    fn band_edges_become_consecutive_pairs() {
        let bands = resolve_bands(&[-1.0, 10.0, 50.0], &[]).unwrap();
        assert_eq!(bands, vec![(-1.0, 10.0), (10.0, 50.0)]);
    }

    #[test]
    fn unordered_band_edges_are_a_configuration_error() {
        let err = resolve_bands(&[10.0, 10.0], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
