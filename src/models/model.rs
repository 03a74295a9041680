//! The exponential density law and the ordered layered model.
//!
//! A fitted atmosphere is an ordered list of `(upper_bound, offset, scale)`
//! layers. Evaluation picks the owning layer by a linear scan (layer counts
//! are in the low tens, so a binary search buys nothing here) and applies the
//! two-parameter exponential law with the configured unit constants.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Unit conversion constants of the density law:
///
/// `density(h) = (offset / scale) * exp(-h * km_to_cm / scale) * output_scale`
///
/// Altitudes are km while `scale` is in cm, hence `km_to_cm`; `output_scale`
/// brings g/cm^3 to the reference-table density unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityLaw {
    pub km_to_cm: f64,
    pub output_scale: f64,
}

impl Default for DensityLaw {
    fn default() -> Self {
        Self {
            km_to_cm: 100_000.0,
            output_scale: 1000.0,
        }
    }
}

impl DensityLaw {
    /// Evaluate the exponential law for one parameter pair.
    ///
    /// The exponent can be very negative at high altitude; the resulting
    /// underflow toward zero is correct physical behavior and is not
    /// special-cased.
    pub fn density(&self, altitude: f64, offset: f64, scale: f64) -> f64 {
        offset / scale * (-altitude * self.km_to_cm / scale).exp() * self.output_scale
    }
}

/// One fitted layer: the exponential law parameters valid below `upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub upper_bound: f64,
    pub offset: f64,
    pub scale: f64,
}

/// An immutable, ordered piecewise exponential atmosphere.
///
/// Invariant: `upper_bound` is strictly increasing across `layers`. Lookup for
/// altitude `h` returns the first layer whose `upper_bound > h`, or the last
/// layer if none qualifies, which makes the last layer the de facto law for
/// all altitudes beyond the model's extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Atmosphere {
    law: DensityLaw,
    layers: Vec<Layer>,
}

impl Atmosphere {
    /// Build a model from ordered layers, validating the ordering invariant.
    pub fn new(law: DensityLaw, layers: Vec<Layer>) -> Result<Self, AppError> {
        if layers.is_empty() {
            return Err(AppError::config("Atmosphere model needs at least one layer."));
        }
        for pair in layers.windows(2) {
            if pair[1].upper_bound <= pair[0].upper_bound {
                return Err(AppError::config(format!(
                    "Layer upper bounds must be strictly increasing: {} then {}.",
                    pair[0].upper_bound, pair[1].upper_bound
                )));
            }
        }
        Ok(Self { law, layers })
    }

    pub fn law(&self) -> DensityLaw {
        self.law
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The layer owning `altitude`: first with `upper_bound > altitude`, else
    /// the last (open-ended extrapolation).
    pub fn layer_at(&self, altitude: f64) -> &Layer {
        self.layers
            .iter()
            .find(|layer| layer.upper_bound > altitude)
            .unwrap_or_else(|| {
                // Safe: the constructor rejects empty layer lists.
                self.layers.last().expect("non-empty layers")
            })
    }

    /// Evaluate the model density at `altitude` (km).
    ///
    /// Pure: identical inputs always yield identical output.
    pub fn density(&self, altitude: f64) -> f64 {
        let layer = self.layer_at(altitude);
        self.law.density(altitude, layer.offset, layer.scale)
    }
}
