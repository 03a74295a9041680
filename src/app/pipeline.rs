//! The fit pipeline: ingest, segment, fit, score, export.

use crate::domain::FitConfig;
use crate::error::AppError;
use crate::fit::{build_tasks, fit_atmosphere, LayerFit, SolverOptions};
use crate::io::{export_model, export_results, load_samples, IngestReport};
use crate::models::Atmosphere;
use crate::report::{evaluate_samples, SampleScore};

/// Everything a fit run produces, for printing and for tests.
#[derive(Debug)]
pub struct RunOutput {
    pub samples: Vec<crate::domain::Sample>,
    pub rows_read: usize,
    pub skipped: Vec<String>,
    pub fits: Vec<LayerFit>,
    pub model: Atmosphere,
    pub scores: Vec<SampleScore>,
}

/// Load the configured table and fit it.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let report = load_samples(&config.table_path)?;
    run_fit_with_table(config, report)
}

/// Fit an already-ingested table. Exports happen here so a failed fit never
/// leaves a partial model or results file behind.
pub fn run_fit_with_table(config: &FitConfig, report: IngestReport) -> Result<RunOutput, AppError> {
    let tasks = build_tasks(&report.samples, config)?;
    let opts = SolverOptions {
        scale_steps: config.scale_steps,
        max_iterations: config.max_iterations,
        ..SolverOptions::default()
    };

    let (model, fits) = fit_atmosphere(&tasks, config.law, &opts)?;
    let scores = evaluate_samples(&model, &report.samples);

    if let Some(path) = &config.export_results {
        export_results(path, &scores)?;
    }
    if let Some(path) = &config.export_model {
        export_model(path, &model)?;
    }

    Ok(RunOutput {
        samples: report.samples,
        rows_read: report.rows_read,
        skipped: report.skipped,
        fits,
        model,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{Sample, DEFAULT_OFFSET, DEFAULT_SCALE, TOP_SEGMENT_OFFSET};
    use crate::error::ErrorKind;
    use crate::models::DensityLaw;

    fn config(boundaries: Vec<f64>) -> FitConfig {
        FitConfig {
            table_path: PathBuf::from("unused.csv"),
            boundaries,
            offset: DEFAULT_OFFSET,
            top_offset: TOP_SEGMENT_OFFSET,
            scale: DEFAULT_SCALE,
            law: DensityLaw::default(),
            scale_steps: 60,
            max_iterations: 200,
            export_results: None,
            export_model: None,
        }
    }

    fn table(samples: Vec<Sample>) -> IngestReport {
        IngestReport {
            rows_read: samples.len(),
            skipped: Vec::new(),
            samples,
        }
    }

    /// Three known exponentials stitched at 3 and 7 km: the first segment's
    /// samples all come from one law, so its parameters must come back
    /// essentially exactly, and evaluation must route altitudes to the right
    /// layer, extrapolating with the last one above the model's extent.
    #[test]
    fn fits_and_evaluates_a_three_segment_table() {
        let law = DensityLaw::default();
        let seg1 = (1183.6071, 954_248.34);
        let seg2 = (1143.0425, 800_005.34);
        let seg3 = (1322.9748, 629_568.93);

        let mut samples = Vec::new();
        for h in [-1.0, 0.0, 1.0, 2.0, 3.0] {
            samples.push(Sample { altitude: h, density: law.density(h, seg1.0, seg1.1) });
        }
        for h in [4.0, 5.0, 6.0, 7.0] {
            samples.push(Sample { altitude: h, density: law.density(h, seg2.0, seg2.1) });
        }
        for h in 8..=110 {
            let h = h as f64;
            samples.push(Sample { altitude: h, density: law.density(h, seg3.0, seg3.1) });
        }

        let config = config(vec![-1.0, 3.0, 7.0, 110.0]);
        let output = run_fit_with_table(&config, table(samples)).unwrap();

        assert_eq!(output.fits.len(), 3);
        let first = &output.fits[0];
        assert!(
            (first.offset - seg1.0).abs() / seg1.0 < 1e-6,
            "offset {} vs {}",
            first.offset,
            seg1.0
        );
        assert!(
            (first.scale - seg1.1).abs() / seg1.1 < 1e-6,
            "scale {} vs {}",
            first.scale,
            seg1.1
        );

        // 2 km falls inside the first layer.
        let at_2 = output.model.density(2.0);
        let want = law.density(2.0, seg1.0, seg1.1);
        assert!((at_2 - want).abs() / want < 1e-6, "density(2) = {at_2}, want {want}");

        // Above the last boundary the final layer extrapolates.
        assert_eq!(
            output.model.layer_at(200.0).upper_bound,
            output.model.layers().last().unwrap().upper_bound
        );
        assert!(output.model.density(200.0).is_finite());
    }

    #[test]
    fn segment_without_samples_fails_the_whole_run() {
        let law = DensityLaw::default();
        let samples: Vec<Sample> = [-1.0, 0.0, 1.0, 2.0]
            .iter()
            .map(|&h| Sample { altitude: h, density: law.density(h, 1183.6071, 954_248.34) })
            .collect();

        // Nothing lands in (10, 20).
        let config = config(vec![-1.0, 3.0, 10.0, 20.0]);
        let err = run_fit_with_table(&config, table(samples)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn malformed_boundaries_fail_before_any_fitting() {
        let config = config(vec![3.0, -1.0]);
        let err = run_fit_with_table(&config, table(vec![Sample { altitude: 0.0, density: 1.2 }]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
