//! JSON persistence for fitted models.
//!
//! Files are re-validated on read through the model constructor, so an
//! edited file with unordered layer bounds is rejected up front.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Atmosphere, DensityLaw, Layer};

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub law: DensityLaw,
    pub layers: Vec<Layer>,
}

impl ModelFile {
    pub fn from_model(model: &Atmosphere) -> Self {
        Self {
            tool: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            law: model.law(),
            layers: model.layers().to_vec(),
        }
    }
}

/// Serialize a model to pretty-printed JSON.
pub fn model_to_json(model: &Atmosphere) -> Result<String, AppError> {
    serde_json::to_string_pretty(&ModelFile::from_model(model))
        .map_err(|err| AppError::io(format!("Cannot serialize model: {err}")))
}

/// Parse and validate a model from JSON text.
pub fn model_from_json(text: &str) -> Result<Atmosphere, AppError> {
    let file: ModelFile = serde_json::from_str(text)
        .map_err(|err| AppError::config(format!("Model file is not valid JSON: {err}")))?;
    Atmosphere::new(file.law, file.layers)
}

/// Write a model file to disk.
pub fn export_model(path: &Path, model: &Atmosphere) -> Result<(), AppError> {
    let text = model_to_json(model)?;
    fs::write(path, text)
        .map_err(|err| AppError::io(format!("Cannot write {}: {err}", path.display())))
}

/// Load a model file from disk.
pub fn load_model(path: &Path) -> Result<Atmosphere, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("Cannot open {}: {err}", path.display())))?;
    model_from_json(&text)
        .map_err(|err| AppError::new(err.kind(), format!("{}: {}", path.display(), err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn model_survives_a_json_round_trip() {
        let model = Atmosphere::new(
            DensityLaw::default(),
            vec![
                Layer { upper_bound: 3.0, offset: 1183.6071, scale: 954_248.34 },
                Layer { upper_bound: 7.0, offset: 1143.0425, scale: 800_005.34 },
            ],
        )
        .unwrap();

        let text = model_to_json(&model).unwrap();
        let restored = model_from_json(&text).unwrap();
        assert_eq!(restored.layers(), model.layers());
    }

    #[test]
    fn unordered_layers_are_rejected_on_read() {
        let text = r#"{
            "tool": "edited by hand",
            "law": { "km_to_cm": 100000.0, "output_scale": 1000.0 },
            "layers": [
                { "upper_bound": 7.0, "offset": 1143.0, "scale": 800005.0 },
                { "upper_bound": 3.0, "offset": 1183.0, "scale": 954248.0 }
            ]
        }"#;

        let err = model_from_json(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
