//! Plain-text rendering of fit results.
//!
//! The model literal block is meant to be pasted straight into C++ source
//! that expects `{upper_bound, offset, scale}` rows, so its number formats
//! are fixed: offsets to four decimals, scales to two.

use crate::fit::LayerFit;
use crate::models::Atmosphere;
use crate::report::BandScore;

/// Render the fitted layers as a brace-delimited initializer block.
pub fn format_model_literal(model: &Atmosphere) -> String {
    let mut out = String::from("{\n");
    for layer in model.layers() {
        out.push_str(&format!(
            "  {{{}, {:.4}, {:.2}}},\n",
            layer.upper_bound, layer.offset, layer.scale
        ));
    }
    out.push('}');
    out
}

/// One human-readable line per fitted segment.
pub fn format_fit_lines(fits: &[LayerFit]) -> String {
    let mut out = String::new();
    for fit in fits {
        out.push_str(&format!(
            "Best fit for nominal range ({}-{}): offset={:.4}, scale={:.2} ({} samples)\n",
            fit.lower, fit.upper_bound, fit.offset, fit.scale, fit.n
        ));
    }
    out
}

/// Fixed-width table of per-band chi-square scores.
pub fn format_band_table(label: &str, scores: &[BandScore]) -> String {
    let mut out = format!("{label}\n");
    out.push_str(&format!(
        "  {:>8} {:>8} {:>6} {:>12} {:>10} {:>10}\n",
        "lower", "upper", "n", "chi_square", "ratio_min", "ratio_max"
    ));
    for s in scores {
        out.push_str(&format!(
            "  {:>8} {:>8} {:>6} {:>12.4e} {:>10.6} {:>10.6}\n",
            s.lower, s.upper, s.n, s.chi_square, s.ratio_min, s.ratio_max
        ));
    }
    out
}

/// Headline summary printed after a fit run.
pub fn format_run_summary(rows_read: usize, rows_used: usize, segments: usize) -> String {
    format!("Fitted {segments} segments from {rows_used} samples ({rows_read} table rows).")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DensityLaw, Layer};

    #[test]
    fn model_literal_uses_fixed_precision_rows() {
        let model = Atmosphere::new(
            DensityLaw::default(),
            vec![
                Layer { upper_bound: 3.0, offset: 1183.6071, scale: 954_248.34 },
                Layer { upper_bound: 7.0, offset: 1143.0425, scale: 800_005.34 },
            ],
        )
        .unwrap();

        let text = format_model_literal(&model);
        assert!(text.starts_with("{\n"), "got: {text}");
        assert!(text.contains("{3, 1183.6071, 954248.34},"), "got: {text}");
        assert!(text.contains("{7, 1143.0425, 800005.34},"), "got: {text}");
        assert!(text.ends_with('}'), "got: {text}");
    }

    #[test]
    fn fit_lines_name_the_nominal_range() {
        let fits = vec![LayerFit {
            lower: -1.0,
            upper_bound: 3.0,
            offset: 1183.6071,
            scale: 954_248.34,
            sse: 0.0,
            n: 5,
        }];

        let text = format_fit_lines(&fits);
        assert!(
            text.contains("Best fit for nominal range (-1-3): offset=1183.6071, scale=954248.34"),
            "got: {text}"
        );
    }

    #[test]
    fn run_summary_counts_rows_and_segments() {
        let text = format_run_summary(120, 118, 16);
        assert!(text.contains("16 segments"), "got: {text}");
        assert!(text.contains("118 samples"), "got: {text}");
    }
}
