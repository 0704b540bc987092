//! Classifier backends.
//!
//! The pipeline only sees [`RiskModel`]: a black box that scores batches of
//! schema-ordered rows. Attribution calls it with thousands of rows at once,
//! so every backend is batch-first.

use std::fmt;
use std::path::Path;

use log::info;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{ConfigError, InferenceError};
use crate::runtime::RuntimeConfig;

mod logistic;
mod onnx;

pub use logistic::LogisticModel;
pub use onnx::OnnxModel;

/// Index of the class whose probability is reported and explained.
pub const POSITIVE_CLASS: usize = 1;

/// A pre-trained binary classifier.
///
/// Implementations are read-only after load and may be shared between threads.
pub trait RiskModel: Send + Sync + fmt::Debug {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Number of features the model was trained on, when the artifact declares it.
    fn input_width(&self) -> Option<usize>;

    /// Class probabilities, shape `[rows, 2]`.
    fn predict_proba(&self, rows: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError>;

    /// Predicted class per row.
    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Array1<i64>, InferenceError> {
        let proba = self.predict_proba(rows)?;
        // first maximum wins, so an exact tie goes to class 0
        Ok(proba.map_axis(Axis(1), |p| {
            p.iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f32)>, (class, &v)| match best {
                    Some((_, top)) if v <= top => best,
                    _ => Some((class, v)),
                })
                .map(|(class, _)| class as i64)
                .unwrap_or(0)
        }))
    }
}

/// Rejects batches whose width disagrees with the model before they reach it.
pub(crate) fn check_batch_width(model: &dyn RiskModel, rows: ArrayView2<'_, f32>) -> Result<(), InferenceError> {
    if let Some(expected) = model.input_width() {
        if rows.ncols() != expected {
            return Err(InferenceError::InputShape {
                expected,
                actual: rows.ncols(),
            });
        }
    }
    Ok(())
}

/// Checks a probability matrix coming back from a backend.
pub(crate) fn check_proba(proba: &Array2<f32>, rows: usize) -> Result<(), InferenceError> {
    if proba.nrows() != rows || proba.ncols() <= POSITIVE_CLASS {
        return Err(InferenceError::Output(format!(
            "expected probabilities of shape [{}, 2], got {:?}",
            rows,
            proba.shape()
        )));
    }
    if proba.iter().any(|p| !p.is_finite()) {
        return Err(InferenceError::Output("non-finite probability".into()));
    }
    Ok(())
}

/// Loads a model artifact, choosing the backend from the file extension:
/// `.onnx` runs through ONNX Runtime, `.json` is a logistic model.
pub fn load_model(path: &Path, runtime: &RuntimeConfig) -> Result<Box<dyn RiskModel>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingArtifact(path.to_path_buf()));
    }
    let model: Box<dyn RiskModel> = match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => Box::new(OnnxModel::load(path, runtime)?),
        Some("json") => Box::new(LogisticModel::load(path)?),
        other => {
            return Err(ConfigError::Invalid {
                what: "model artifact".into(),
                path: path.to_path_buf(),
                reason: format!("unsupported extension {:?}, expected .onnx or .json", other),
            })
        }
    };
    info!("Loaded {}", model.describe());
    Ok(model)
}
