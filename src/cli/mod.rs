//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    FitConfig, ParamSpec, DEFAULT_BOUNDARIES, DEFAULT_OFFSET, DEFAULT_SCALE, TOP_SEGMENT_OFFSET,
};
use crate::models::{DensityLaw, ReferenceModel};

#[derive(Debug, Parser)]
#[command(
    name = "atmofit",
    version,
    about = "Fit piecewise exponential atmosphere models to density tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a layered model to a density table.
    Fit(FitArgs),
    /// Score reference or saved models against a density table.
    Compare(CompareArgs),
    /// Generate a synthetic density table from a reference model.
    Sample(SampleArgs),
}

#[derive(Debug, Args)]
pub struct FitArgs {
    /// CSV table with altitude and density columns.
    #[arg(long)]
    pub table: PathBuf,

    /// Strictly increasing segment boundaries in km.
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        num_args = 1..,
        default_values_t = DEFAULT_BOUNDARIES
    )]
    pub boundaries: Vec<f64>,

    /// Offset box for interior segments.
    #[arg(long, default_value_t = DEFAULT_OFFSET.bounds.lo)]
    pub offset_min: f64,
    #[arg(long, default_value_t = DEFAULT_OFFSET.bounds.hi)]
    pub offset_max: f64,
    #[arg(long, default_value_t = DEFAULT_OFFSET.guess)]
    pub offset_guess: f64,

    /// Lower offset bound for the final segment (near-vacuum densities).
    #[arg(long, default_value_t = TOP_SEGMENT_OFFSET.bounds.lo)]
    pub top_offset_min: f64,

    /// Scale box shared by all segments.
    #[arg(long, default_value_t = DEFAULT_SCALE.bounds.lo)]
    pub scale_min: f64,
    #[arg(long, default_value_t = DEFAULT_SCALE.bounds.hi)]
    pub scale_max: f64,
    #[arg(long, default_value_t = DEFAULT_SCALE.guess)]
    pub scale_guess: f64,

    /// Log-spaced scale candidates evaluated before refinement.
    #[arg(long, default_value_t = 60)]
    pub scale_steps: usize,

    /// Refinement iteration cap per segment.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,

    /// Write per-sample fitted densities and ratios as CSV.
    #[arg(long)]
    pub export_results: Option<PathBuf>,

    /// Write the fitted model as JSON.
    #[arg(long)]
    pub export_model: Option<PathBuf>,
}

impl FitArgs {
    pub fn into_config(self) -> FitConfig {
        FitConfig {
            table_path: self.table,
            boundaries: self.boundaries,
            offset: ParamSpec::new(self.offset_min, self.offset_max, self.offset_guess),
            top_offset: ParamSpec::new(self.top_offset_min, self.offset_max, self.offset_guess),
            scale: ParamSpec::new(self.scale_min, self.scale_max, self.scale_guess),
            law: DensityLaw::default(),
            scale_steps: self.scale_steps,
            max_iterations: self.max_iterations,
            export_results: self.export_results,
            export_model: self.export_model,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// CSV table with altitude and density columns.
    #[arg(long)]
    pub table: PathBuf,

    /// Built-in reference models to score; both when omitted.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub models: Vec<ReferenceModel>,

    /// Previously exported model file to score alongside the references.
    #[arg(long)]
    pub model_file: Option<PathBuf>,

    /// Band edges in km; consecutive pairs form the scored bands.
    /// Omitted: one band spanning the whole table.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, num_args = 0..)]
    pub bands: Vec<f64>,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long)]
    pub out: PathBuf,

    /// Reference model to sample.
    #[arg(long, value_enum, default_value_t = ReferenceModel::UsStd)]
    pub model: ReferenceModel,

    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub alt_min: f64,
    #[arg(long, default_value_t = 112.0)]
    pub alt_max: f64,
    #[arg(long, default_value_t = 0.5)]
    pub step: f64,

    /// Relative Gaussian noise level; 0 disables noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fit_defaults_match_the_standard_boundaries_and_boxes() {
        let cli = Cli::try_parse_from(["atmofit", "fit", "--table", "atmo.csv"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };

        let config = args.into_config();
        assert_eq!(config.boundaries, DEFAULT_BOUNDARIES.to_vec());
        assert_eq!(config.offset, DEFAULT_OFFSET);
        assert_eq!(config.top_offset, TOP_SEGMENT_OFFSET);
        assert_eq!(config.scale, DEFAULT_SCALE);
        assert_eq!(config.scale_steps, 60);
        assert_eq!(config.max_iterations, 200);
    }

    #[test]
    fn boundary_list_accepts_negative_first_entry() {
        let cli = Cli::try_parse_from([
            "atmofit", "fit", "--table", "atmo.csv", "--boundaries", "-1,3,7,110",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.boundaries, vec![-1.0, 3.0, 7.0, 110.0]);
    }

    #[test]
    fn compare_parses_model_list() {
        let cli = Cli::try_parse_from([
            "atmofit", "compare", "--table", "atmo.csv", "--models", "us-std,linsley",
        ])
        .unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare subcommand");
        };
        assert_eq!(args.models, vec![ReferenceModel::UsStd, ReferenceModel::Linsley]);
        assert!(args.bands.is_empty());
    }
}
