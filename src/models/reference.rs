//! Built-in CORSIKA 7 reference parameter sets.
//!
//! These are the five-layer US-standard and Linsley atmospheres the fit is
//! compared against. The top layer `(112.8, 1, 1e9)` is the conventional
//! near-vacuum cap.

use clap::ValueEnum;

use crate::models::{Atmosphere, DensityLaw, Layer};

/// Selectable built-in reference model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReferenceModel {
    UsStd,
    Linsley,
}

impl ReferenceModel {
    pub fn display_name(self) -> &'static str {
        match self {
            ReferenceModel::UsStd => "US-Std",
            ReferenceModel::Linsley => "Linsley",
        }
    }

    pub fn build(self) -> Atmosphere {
        match self {
            ReferenceModel::UsStd => us_std(),
            ReferenceModel::Linsley => linsley(),
        }
    }
}

/// CORSIKA 7 US-standard atmosphere.
pub fn us_std() -> Atmosphere {
    let layers = vec![
        Layer { upper_bound: 7.0, offset: 1183.6071, scale: 954_248.34 },
        Layer { upper_bound: 11.4, offset: 1143.0425, scale: 800_005.34 },
        Layer { upper_bound: 37.0, offset: 1322.9748, scale: 629_568.93 },
        Layer { upper_bound: 100.0, offset: 655.673_07, scale: 737_521.77 },
        Layer { upper_bound: 112.8, offset: 1.0, scale: 1.0e9 },
    ];
    Atmosphere::new(DensityLaw::default(), layers).expect("reference layers are ordered")
}

/// CORSIKA 7 Linsley atmosphere.
pub fn linsley() -> Atmosphere {
    let layers = vec![
        Layer { upper_bound: 4.0, offset: 1222.6562, scale: 994_186.38 },
        Layer { upper_bound: 10.0, offset: 1144.9069, scale: 878_153.55 },
        Layer { upper_bound: 40.0, offset: 1305.5948, scale: 636_143.04 },
        Layer { upper_bound: 100.0, offset: 540.1778, scale: 772_170.16 },
        Layer { upper_bound: 112.8, offset: 1.0, scale: 1.0e9 },
    ];
    Atmosphere::new(DensityLaw::default(), layers).expect("reference layers are ordered")
}
