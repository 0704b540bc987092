use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{check_batch_width, RiskModel};
use crate::error::{ConfigError, InferenceError};
use crate::schema::FEATURE_SCHEMA;

/// A logistic regression classifier stored as JSON.
///
/// ```json
/// { "schema_version": "german-credit-v1", "intercept": -0.4, "coefficients": [0.02, ...] }
/// ```
///
/// `means` and `scales`, when present, standardise each feature before the
/// dot product, as a fitted scaler in front of the regression would.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub schema_version: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub means: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scales: Option<Vec<f64>>,
}

impl LogisticModel {
    /// Builds a model directly from weights, for the current schema.
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            schema_version: FEATURE_SCHEMA.version.to_string(),
            intercept,
            coefficients,
            means: None,
            scales: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            what: "logistic model".into(),
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != FEATURE_SCHEMA.version {
            return Err(ConfigError::SchemaMismatch(format!(
                "model was trained on schema {}, this build uses {}",
                self.schema_version, FEATURE_SCHEMA.version
            )));
        }
        FEATURE_SCHEMA.check_width(Some(self.coefficients.len()), "logistic model")?;
        for (name, extra) in [("means", &self.means), ("scales", &self.scales)] {
            if let Some(values) = extra {
                if values.len() != self.coefficients.len() {
                    return Err(ConfigError::SchemaMismatch(format!(
                        "logistic model has {} coefficients but {} {}",
                        self.coefficients.len(),
                        values.len(),
                        name
                    )));
                }
            }
        }
        if self.scales.iter().flatten().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(ConfigError::Model("logistic model has a zero or non-finite scale".into()));
        }
        Ok(())
    }

    fn logit(&self, row: ndarray::ArrayView1<'_, f32>) -> f64 {
        let mut z = self.intercept;
        for (j, (&x, &w)) in row.iter().zip(&self.coefficients).enumerate() {
            let mut x = f64::from(x);
            if let Some(means) = &self.means {
                x -= means[j];
            }
            if let Some(scales) = &self.scales {
                x /= scales[j];
            }
            z += w * x;
        }
        z
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskModel for LogisticModel {
    fn describe(&self) -> String {
        format!(
            "logistic model ({} features, schema {})",
            self.coefficients.len(),
            self.schema_version
        )
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
        check_batch_width(self, rows)?;
        let positive: Array1<f64> = rows.outer_iter().map(|row| sigmoid(self.logit(row))).collect();
        let mut proba = Array2::zeros((rows.nrows(), 2));
        for (i, p) in positive.iter().enumerate() {
            proba[[i, 0]] = (1.0 - p) as f32;
            proba[[i, 1]] = *p as f32;
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COUNT;
    use approx::assert_relative_eq;

    fn weights() -> Vec<f64> {
        let mut w = vec![0.0; FEATURE_COUNT];
        w[0] = 0.1;
        w[2] = -0.05;
        w
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = LogisticModel::new(0.5, weights());
        let mut rows = Array2::<f32>::zeros((3, FEATURE_COUNT));
        rows[[1, 0]] = 12.0;
        rows[[2, 2]] = 40.0;

        let proba = model.predict_proba(rows.view()).unwrap();
        for row in proba.outer_iter() {
            assert_relative_eq!(row[0] + row[1], 1.0, epsilon = 1e-6);
        }
        assert_relative_eq!(proba[[0, 1]], sigmoid(0.5) as f32, epsilon = 1e-6);
        assert_relative_eq!(proba[[1, 1]], sigmoid(0.5 + 1.2) as f32, epsilon = 1e-6);
        assert_relative_eq!(proba[[2, 1]], sigmoid(0.5 - 2.0) as f32, epsilon = 1e-6);
        assert_eq!(model.predict(rows.view()).unwrap().to_vec(), vec![1, 1, 0]);
    }

    #[test]
    fn test_standardisation() {
        let mut model = LogisticModel::new(0.0, weights());
        model.means = Some(vec![10.0; FEATURE_COUNT]);
        model.scales = Some(vec![2.0; FEATURE_COUNT]);
        let mut rows = Array2::<f32>::from_elem((1, FEATURE_COUNT), 10.0);
        rows[[0, 0]] = 14.0;

        let proba = model.predict_proba(rows.view()).unwrap();
        assert_relative_eq!(proba[[0, 1]], sigmoid(0.1 * 2.0) as f32, epsilon = 1e-6);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = LogisticModel::new(0.0, weights());
        let rows = Array2::<f32>::zeros((1, FEATURE_COUNT - 1));
        assert!(matches!(
            model.predict_proba(rows.view()),
            Err(InferenceError::InputShape { .. })
        ));
    }

    #[test]
    fn test_load_validates_schema() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.json");
        fs::write(&good, serde_json::to_string(&LogisticModel::new(0.1, weights())).unwrap()).unwrap();
        assert_eq!(LogisticModel::load(&good).unwrap().coefficients.len(), FEATURE_COUNT);

        let short = dir.path().join("short.json");
        fs::write(&short, serde_json::to_string(&LogisticModel::new(0.1, vec![1.0; 3])).unwrap()).unwrap();
        assert!(matches!(LogisticModel::load(&short), Err(ConfigError::SchemaMismatch(_))));

        let mut old = LogisticModel::new(0.1, weights());
        old.schema_version = "german-credit-v0".into();
        let stale = dir.path().join("stale.json");
        fs::write(&stale, serde_json::to_string(&old).unwrap()).unwrap();
        assert!(matches!(LogisticModel::load(&stale), Err(ConfigError::SchemaMismatch(_))));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"intercept\": ").unwrap();
        assert!(matches!(LogisticModel::load(&broken), Err(ConfigError::Invalid { .. })));
    }
}
