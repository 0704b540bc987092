use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::assembler::FeatureVector;
use crate::attribution::{ContributionVector, KernelExplainer};
use crate::error::InferenceError;
use crate::model::{RiskModel, POSITIVE_CLASS};

/// Outcome shown on the risk metric. The classifier was trained with class 0
/// as a bad credit risk and class 1 as a good one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    Bad,
    Good,
}

impl RiskLabel {
    pub fn from_class(class: i64) -> Self {
        if class == 0 {
            RiskLabel::Bad
        } else {
            RiskLabel::Good
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::Bad => f.write_str("Bad"),
            RiskLabel::Good => f.write_str("Good"),
        }
    }
}

/// Predicted class and positive-class probability for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub class: i64,
    pub label: RiskLabel,
    pub probability: f64,
}

/// Everything inference produces for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub result: InferenceResult,
    pub contributions: ContributionVector,
}

/// Runs the classifier and the attribution engine on an assembled row.
///
/// Holds shared, read-only handles; cloning is cheap.
#[derive(Debug, Clone)]
pub struct InferenceAdapter {
    model: Arc<dyn RiskModel>,
    explainer: Arc<KernelExplainer>,
}

impl InferenceAdapter {
    pub fn new(model: Arc<dyn RiskModel>, explainer: Arc<KernelExplainer>) -> Self {
        Self { model, explainer }
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    pub fn explainer(&self) -> &KernelExplainer {
        &self.explainer
    }

    /// Label and positive-class probability for `row`.
    pub fn predict(&self, row: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        self.check_width(row)?;
        let batch = row.to_batch();

        let class = self
            .model
            .predict(batch.view())?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::Output("model returned no label".into()))?;
        let proba = self.model.predict_proba(batch.view())?;
        let probability = proba
            .get((0, POSITIVE_CLASS))
            .map(|&p| f64::from(p))
            .ok_or_else(|| InferenceError::Output(format!("probabilities have shape {:?}", proba.shape())))?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::Output(format!("probability {} is outside [0, 1]", probability)));
        }

        debug!("Predicted class {} with positive-class probability {:.4}", class, probability);
        Ok(InferenceResult {
            class,
            label: RiskLabel::from_class(class),
            probability,
        })
    }

    /// Per-feature contributions for `row`. Potentially slow.
    pub fn explain(&self, row: &FeatureVector) -> Result<ContributionVector, InferenceError> {
        self.check_width(row)?;
        self.explainer.explain(row)
    }

    /// Prediction and explanation together.
    pub fn assess(&self, row: &FeatureVector) -> Result<Assessment, InferenceError> {
        let result = self.predict(row).map_err(|e| {
            warn!("Prediction failed: {}", e);
            e
        })?;
        let contributions = self.explain(row).map_err(|e| {
            warn!("Attribution failed: {}", e);
            e
        })?;
        Ok(Assessment { result, contributions })
    }

    fn check_width(&self, row: &FeatureVector) -> Result<(), InferenceError> {
        let expected = self.model.input_width().unwrap_or(row.schema().len());
        if row.len() != expected {
            return Err(InferenceError::InputShape {
                expected,
                actual: row.len(),
            });
        }
        Ok(())
    }
}
