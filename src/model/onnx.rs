use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2, Ix1, Ix2};
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use super::{check_batch_width, check_proba, RiskModel};
use crate::error::{ConfigError, InferenceError};
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::schema::FEATURE_SCHEMA;

/// A scikit-learn classifier exported to ONNX with `zipmap=False`.
///
/// The graph is expected to:
/// - accept one float input of shape `[batch_size, n_features]`
/// - output the predicted label (int64, `[batch_size]`)
/// - output class probabilities (float, `[batch_size, 2]`)
///
/// Outputs are located by name (`label`/`output_label` and
/// `probabilities`/`output_probability`), falling back to positions 0 and 1.
#[derive(Debug)]
pub struct OnnxModel {
    pub model_path: String,
    session: Arc<Session>,
    input_name: String,
    input_width: Option<usize>,
    label_output: usize,
    proba_output: usize,
}

fn assert_send_sync<T: Send + Sync>() {}

// Compile-time verification of thread-safety
const _: fn() = assert_send_sync::<OnnxModel>;

impl OnnxModel {
    pub fn load(path: &Path, runtime: &RuntimeConfig) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingArtifact(path.to_path_buf()));
        }

        let session = create_session_builder(runtime)?.commit_from_file(path)?;
        let (input_name, input_width, label_output, proba_output) = Self::validate_model(&session)?;
        FEATURE_SCHEMA.check_width(input_width, "ONNX model input")?;
        info!("ONNX model structure validated successfully");

        Ok(Self {
            model_path: path.to_string_lossy().to_string(),
            session: Arc::new(session),
            input_name,
            input_width,
            label_output,
            proba_output,
        })
    }

    /// Validates that the model has the expected input/output structure and
    /// returns the input name, its static width (if declared) and the output
    /// positions of labels and probabilities.
    fn validate_model(session: &Session) -> Result<(String, Option<usize>, usize, usize), ConfigError> {
        let inputs = &session.inputs;
        if inputs.len() != 1 {
            return Err(ConfigError::Model(format!(
                "Model must have exactly 1 input (the feature row), found {}",
                inputs.len()
            )));
        }
        let input = &inputs[0];
        let input_width = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => {
                if dimensions.len() != 2 {
                    return Err(ConfigError::Model(format!(
                        "Model input '{}' must be 2-dimensional, found {} dimensions",
                        input.name,
                        dimensions.len()
                    )));
                }
                usize::try_from(dimensions[1]).ok().filter(|&w| w > 0)
            }
            other => {
                return Err(ConfigError::Model(format!(
                    "Model input '{}' must be a tensor, found {:?}",
                    input.name, other
                )))
            }
        };

        let outputs = &session.outputs;
        if outputs.len() < 2 {
            return Err(ConfigError::Model(format!(
                "Model must have at least 2 outputs (label and probabilities), found {}. \
                 Export with zipmap disabled.",
                outputs.len()
            )));
        }
        let position = |names: &[&str], fallback: usize| {
            outputs
                .iter()
                .position(|o| names.contains(&o.name.as_str()))
                .unwrap_or(fallback)
        };
        let label_output = position(&["label", "output_label"], 0);
        let proba_output = position(&["probabilities", "output_probability"], 1);
        if label_output == proba_output {
            return Err(ConfigError::Model("Label and probability outputs are the same tensor".into()));
        }
        if !matches!(outputs[proba_output].output_type, ValueType::Tensor { .. }) {
            return Err(ConfigError::Model(format!(
                "Probability output '{}' is not a tensor. Export with zipmap disabled.",
                outputs[proba_output].name
            )));
        }

        Ok((input.name.clone(), input_width, label_output, proba_output))
    }

    /// Runs the graph once and returns labels and probabilities.
    fn run(&self, rows: ArrayView2<'_, f32>) -> Result<(Array1<i64>, Array2<f32>), InferenceError> {
        check_batch_width(self, rows)?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(rows.to_owned())
                .map_err(|e| InferenceError::Model(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| InferenceError::Model(format!("Failed to run model: {}", e)))?;

        let labels = outputs[self.label_output]
            .try_extract_tensor::<i64>()
            .map_err(|e| InferenceError::Output(format!("Failed to extract labels: {}", e)))?
            .into_dimensionality::<Ix1>()
            .map_err(|e| InferenceError::Output(format!("Labels have unexpected shape: {}", e)))?
            .to_owned();
        let proba = outputs[self.proba_output]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Output(format!("Failed to extract probabilities: {}", e)))?
            .into_dimensionality::<Ix2>()
            .map_err(|e| InferenceError::Output(format!("Probabilities have unexpected shape: {}", e)))?
            .to_owned();

        check_proba(&proba, rows.nrows())?;
        if labels.len() != rows.nrows() {
            return Err(InferenceError::Output(format!(
                "expected {} labels, got {}",
                rows.nrows(),
                labels.len()
            )));
        }
        debug!("ONNX run scored {} rows", rows.nrows());
        Ok((labels, proba))
    }
}

impl RiskModel for OnnxModel {
    fn describe(&self) -> String {
        format!("ONNX model {} (input '{}')", self.model_path, self.input_name)
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
        self.run(rows).map(|(_, proba)| proba)
    }

    fn predict(&self, rows: ArrayView2<'_, f32>) -> Result<Array1<i64>, InferenceError> {
        self.run(rows).map(|(labels, _)| labels)
    }
}
