//! Per-feature contributions via KernelSHAP.
//!
//! The classifier is treated as a black box. For one instance `x` the engine
//! builds coalitions of features, evaluates the model with coalition features
//! taken from `x` and the rest taken from each background row, and fits a
//! weighted linear model (Shapley kernel weights) whose coefficients are the
//! contributions. The fit is constrained so that
//! `base_value + sum(contributions) == f(x)`.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::assembler::FeatureVector;
use crate::background::BackgroundData;
use crate::error::{ConfigError, InferenceError};
use crate::model::{RiskModel, POSITIVE_CLASS};

/// Tuning for [`KernelExplainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    /// Coalitions to evaluate. `None` uses `2 * M + 2048` for `M` varying features.
    pub nsamples: Option<usize>,
    /// Seed for coalition sampling; a fixed seed makes explanations reproducible.
    pub seed: u64,
    /// Background rows kept for attribution (0 keeps all).
    pub max_background_rows: usize,
    /// Upper bound on synthetic rows sent to the model in one call.
    pub batch_rows: usize,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            nsamples: None,
            seed: 42,
            max_background_rows: 100,
            batch_rows: 65_536,
        }
    }
}

/// One feature's share of the prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    /// The applicant's value for this feature
    pub value: f32,
    /// Signed shift of the positive-class probability
    pub contribution: f64,
}

/// Contributions for every schema slot, in schema order, plus the base value
/// they are measured from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionVector {
    base_value: f64,
    items: Vec<Contribution>,
}

impl ContributionVector {
    pub fn new(base_value: f64, items: Vec<Contribution>) -> Self {
        Self { base_value, items }
    }

    /// Pairs schema names and instance values with raw contributions.
    pub fn from_parts(base_value: f64, instance: &FeatureVector, phi: &[f64]) -> Self {
        let items = instance
            .schema()
            .iter()
            .zip(instance.values().iter())
            .zip(phi)
            .map(|((name, &value), &contribution)| Contribution {
                feature: name.to_string(),
                value,
                contribution,
            })
            .collect();
        Self { base_value, items }
    }

    /// Expected positive-class probability over the background data.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Contribution] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<&Contribution> {
        self.items.iter().find(|c| c.feature == feature)
    }

    /// Sum of contributions, i.e. `f(x) - base_value`.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|c| c.contribution).sum()
    }
}

impl<'a> IntoIterator for &'a ContributionVector {
    type Item = &'a Contribution;
    type IntoIter = std::slice::Iter<'a, Contribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Smallest usable coalition budget.
pub const MIN_SAMPLES: usize = 2;

/// KernelSHAP over a fixed model and background dataset.
#[derive(Debug)]
pub struct KernelExplainer {
    model: Arc<dyn RiskModel>,
    background: BackgroundData,
    config: ExplainerConfig,
    base_value: f64,
}

impl KernelExplainer {
    /// Summarises the background and scores it once to get the base value.
    pub fn new(
        model: Arc<dyn RiskModel>,
        background: BackgroundData,
        config: ExplainerConfig,
    ) -> Result<Self, ConfigError> {
        if let Some(n) = config.nsamples.filter(|&n| n < MIN_SAMPLES) {
            return Err(ConfigError::Invalid {
                what: "explainer configuration".into(),
                path: Default::default(),
                reason: format!("nsamples must be at least {}, got {}", MIN_SAMPLES, n),
            });
        }
        let background = background.summarize(config.max_background_rows);
        let proba = model
            .predict_proba(background.rows())
            .map_err(|e| ConfigError::Model(format!("model cannot score the background data: {}", e)))?;
        if proba.ncols() <= POSITIVE_CLASS || proba.nrows() != background.len() {
            return Err(ConfigError::Model(format!(
                "model returned probabilities of shape {:?} for {} background rows",
                proba.shape(),
                background.len()
            )));
        }
        let base_value = proba.column(POSITIVE_CLASS).iter().map(|&p| f64::from(p)).sum::<f64>()
            / background.len() as f64;
        info!(
            "Attribution engine ready: {} background rows, base value {:.4}",
            background.len(),
            base_value
        );
        Ok(Self {
            model,
            background,
            config,
            base_value,
        })
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn background(&self) -> &BackgroundData {
        &self.background
    }

    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    /// Explains the positive-class probability for one instance.
    ///
    /// This evaluates the model on `nsamples * background_rows` synthetic rows
    /// and blocks until done.
    pub fn explain(&self, instance: &FeatureVector) -> Result<ContributionVector, InferenceError> {
        let width = self.background.rows().ncols();
        if instance.len() != width {
            return Err(InferenceError::InputShape {
                expected: width,
                actual: instance.len(),
            });
        }
        let x = instance.values();
        let fx = self.positive_proba(x)?;

        let varying: Vec<usize> = (0..width)
            .filter(|&j| self.background.rows().column(j).iter().any(|&b| b != x[j]))
            .collect();
        let m = varying.len();
        let mut phi = vec![0.0; width];

        match m {
            0 => {}
            1 => phi[varying[0]] = fx - self.base_value,
            _ => {
                let coalitions = self.sample_coalitions(m);
                debug!(
                    "KernelSHAP: {} varying features, {} coalitions, {} background rows",
                    m,
                    coalitions.len(),
                    self.background.len()
                );
                let ey = self.evaluate(x, &varying, &coalitions)?;
                let weights = solve_constrained(&coalitions, &ey, fx - self.base_value, self.base_value)?;
                for (&j, w) in varying.iter().zip(weights) {
                    phi[j] = w;
                }
            }
        }

        Ok(ContributionVector::from_parts(self.base_value, instance, &phi))
    }

    fn positive_proba(&self, x: ArrayView1<'_, f32>) -> Result<f64, InferenceError> {
        let batch = x.to_owned().insert_axis(Axis(0));
        let proba = self.model.predict_proba(batch.view())?;
        proba
            .get((0, POSITIVE_CLASS))
            .map(|&p| f64::from(p))
            .ok_or_else(|| InferenceError::Output(format!("probabilities have shape {:?}", proba.shape())))
    }

    /// Chooses coalitions over `m` varying features, returning each mask with
    /// its kernel weight.
    fn sample_coalitions(&self, m: usize) -> Coalitions {
        let mut nsamples = self.config.nsamples.unwrap_or(2 * m + 2048);
        if m <= 30 {
            nsamples = nsamples.min((1usize << m) - 2);
        }

        let num_subset_sizes = (m - 1).div_ceil(2);
        let num_paired_subset_sizes = (m - 1) / 2;

        let mut weight_vector: Vec<f64> = (1..=num_subset_sizes)
            .map(|s| (m as f64 - 1.0) / (s as f64 * (m - s) as f64))
            .collect();
        for w in weight_vector.iter_mut().take(num_paired_subset_sizes) {
            *w *= 2.0;
        }
        let total: f64 = weight_vector.iter().sum();
        weight_vector.iter_mut().for_each(|w| *w /= total);

        let mut coalitions = Coalitions::new();

        // Enumerate whole subset sizes, smallest first, while the budget covers them.
        let mut num_full_subsets = 0;
        let mut samples_left = nsamples as f64;
        let mut remaining = weight_vector.clone();
        for subset_size in 1..=num_subset_sizes {
            let paired = subset_size <= num_paired_subset_sizes;
            let mut nsubsets = binomial(m, subset_size);
            if paired {
                nsubsets *= 2.0;
            }
            if samples_left * remaining[subset_size - 1] / nsubsets < 1.0 - 1e-8 {
                break;
            }
            num_full_subsets += 1;
            samples_left -= nsubsets;
            let share = remaining[subset_size - 1];
            if share < 1.0 {
                remaining.iter_mut().for_each(|w| *w /= 1.0 - share);
            }

            let mut w = weight_vector[subset_size - 1] / binomial(m, subset_size);
            if paired {
                w /= 2.0;
            }
            for inds in Combinations::new(m, subset_size) {
                let mut mask = vec![false; m];
                inds.iter().for_each(|&i| mask[i] = true);
                if paired {
                    let complement: Vec<bool> = mask.iter().map(|&b| !b).collect();
                    coalitions.push(mask, w);
                    coalitions.push(complement, w);
                } else {
                    coalitions.push(mask, w);
                }
            }
        }

        // Sample the remaining subset sizes from the kernel distribution.
        let fixed = coalitions.len();
        let mut samples_left = nsamples.saturating_sub(fixed);
        if num_full_subsets != num_subset_sizes && samples_left > 0 {
            let tail = &weight_vector[num_full_subsets..];
            let mut rng = StdRng::seed_from_u64(self.config.seed);
            if let Ok(dist) = WeightedIndex::new(tail) {
                let mut draws = 0;
                while samples_left > 0 && draws < 4 * nsamples {
                    draws += 1;
                    let subset_size = rng.sample(&dist) + num_full_subsets + 1;
                    let mut mask = vec![false; m];
                    for i in rand::seq::index::sample(&mut rng, m, subset_size) {
                        mask[i] = true;
                    }
                    let paired = subset_size <= num_paired_subset_sizes;
                    let complement: Vec<bool> = mask.iter().map(|&b| !b).collect();

                    if coalitions.add_or_bump(mask) {
                        samples_left -= 1;
                    }
                    if samples_left > 0 && paired && coalitions.add_or_bump(complement) {
                        samples_left -= 1;
                    }
                }
            }

            let weight_left: f64 = tail.iter().sum();
            coalitions.rescale_from(fixed, weight_left);
        }

        coalitions
    }

    /// Mean positive-class probability for every coalition, with coalition
    /// features taken from `x` and the rest from each background row.
    fn evaluate(
        &self,
        x: ArrayView1<'_, f32>,
        varying: &[usize],
        coalitions: &Coalitions,
    ) -> Result<Array1<f64>, InferenceError> {
        let bg = self.background.rows();
        let n_bg = bg.nrows();
        let per_batch = (self.config.batch_rows / n_bg).max(1);
        let mut ey = Array1::zeros(coalitions.len());

        let mut start = 0;
        while start < coalitions.len() {
            let end = (start + per_batch).min(coalitions.len());
            let mut synth = Array2::zeros(((end - start) * n_bg, bg.ncols()));
            for (k, mask) in coalitions.masks[start..end].iter().enumerate() {
                let mut block = synth.slice_mut(ndarray::s![k * n_bg..(k + 1) * n_bg, ..]);
                block.assign(&bg);
                for (pos, &j) in varying.iter().enumerate() {
                    if mask[pos] {
                        block.column_mut(j).fill(x[j]);
                    }
                }
            }

            let proba = self
                .model
                .predict_proba(synth.view())
                .map_err(|e| InferenceError::Attribution(e.to_string()))?;
            if proba.nrows() != synth.nrows() || proba.ncols() <= POSITIVE_CLASS {
                return Err(InferenceError::Attribution(format!(
                    "model returned shape {:?} for {} synthetic rows",
                    proba.shape(),
                    synth.nrows()
                )));
            }
            for k in 0..(end - start) {
                let block = proba.slice(ndarray::s![k * n_bg..(k + 1) * n_bg, POSITIVE_CLASS]);
                ey[start + k] = block.iter().map(|&p| f64::from(p)).sum::<f64>() / n_bg as f64;
            }
            start = end;
        }
        Ok(ey)
    }
}

/// Coalition masks with their kernel weights.
#[derive(Debug)]
struct Coalitions {
    masks: Vec<Vec<bool>>,
    weights: Vec<f64>,
    index: HashMap<Vec<bool>, usize>,
}

impl Coalitions {
    fn new() -> Self {
        Self {
            masks: Vec::new(),
            weights: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.masks.len()
    }

    fn push(&mut self, mask: Vec<bool>, weight: f64) {
        self.index.insert(mask.clone(), self.masks.len());
        self.masks.push(mask);
        self.weights.push(weight);
    }

    /// Adds a sampled mask with weight 1, or bumps the weight of a repeat.
    /// Returns whether the mask was new.
    fn add_or_bump(&mut self, mask: Vec<bool>) -> bool {
        match self.index.get(&mask) {
            Some(&i) => {
                self.weights[i] += 1.0;
                false
            }
            None => {
                self.push(mask, 1.0);
                true
            }
        }
    }

    /// Scales the weights of sampled coalitions so they sum to `total`.
    fn rescale_from(&mut self, start: usize, total: f64) {
        let sampled: f64 = self.weights[start..].iter().sum();
        if sampled > 0.0 {
            self.weights[start..].iter_mut().for_each(|w| *w *= total / sampled);
        }
    }
}

/// Weighted least squares for the contributions of `m` features under the
/// constraint `sum(phi) == delta`. The last feature is eliminated through the
/// constraint, leaving an unconstrained `m - 1` variable problem.
fn solve_constrained(
    coalitions: &Coalitions,
    ey: &Array1<f64>,
    delta: f64,
    base_value: f64,
) -> Result<Vec<f64>, InferenceError> {
    let m = coalitions.masks.first().map(|mask| mask.len()).unwrap_or(0);
    if m < 2 {
        return Err(InferenceError::Attribution(format!(
            "{} coalitions over {} features cannot be solved",
            coalitions.len(),
            m
        )));
    }
    let last = m - 1;
    let n = m - 1;

    let mut xtwx = vec![vec![0.0; n]; n];
    let mut xtwy = vec![0.0; n];
    for ((mask, &w), &y) in coalitions.masks.iter().zip(&coalitions.weights).zip(ey.iter()) {
        let z_last = if mask[last] { 1.0 } else { 0.0 };
        let target = (y - base_value) - z_last * delta;
        let row: Vec<f64> = (0..n)
            .map(|j| (if mask[j] { 1.0 } else { 0.0 }) - z_last)
            .collect();
        for a in 0..n {
            if row[a] == 0.0 {
                continue;
            }
            xtwy[a] += w * row[a] * target;
            for b in 0..n {
                xtwx[a][b] += w * row[a] * row[b];
            }
        }
    }

    let mut phi = solve_linear(xtwx, xtwy)
        .ok_or_else(|| InferenceError::Attribution("coalition system is singular".into()))?;
    let rest: f64 = phi.iter().sum();
    phi.push(delta - rest);
    Ok(phi)
}

/// Gaussian elimination with partial pivoting.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * a[col][k];
                a[row][k] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Lexicographic `k`-subsets of `0..n`.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (k <= n).then(|| (0..k).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.clone()?;
        let k = out.len();
        let mut next = out.clone();
        let mut i = k;
        loop {
            if i == 0 {
                self.current = None;
                break;
            }
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in i + 1..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogisticModel;
    use crate::schema::{FEATURE_COUNT, FEATURE_SCHEMA};
    use approx::assert_abs_diff_eq;
    use ndarray::ArrayView2;

    /// A model whose positive-class probability is linear in its inputs, so
    /// exact Shapley values are known in closed form.
    #[derive(Debug)]
    struct Linear {
        bias: f32,
        coef: Vec<f32>,
    }

    impl RiskModel for Linear {
        fn describe(&self) -> String {
            "linear".into()
        }
        fn input_width(&self) -> Option<usize> {
            Some(self.coef.len())
        }
        fn predict_proba(&self, rows: ArrayView2<'_, f32>) -> Result<Array2<f32>, InferenceError> {
            crate::model::check_batch_width(self, rows)?;
            let mut proba = Array2::zeros((rows.nrows(), 2));
            for (i, row) in rows.outer_iter().enumerate() {
                let p = self.bias + row.iter().zip(&self.coef).map(|(x, c)| x * c).sum::<f32>();
                proba[[i, 0]] = 1.0 - p;
                proba[[i, 1]] = p;
            }
            Ok(proba)
        }
    }

    fn background() -> BackgroundData {
        let rows = Array2::from_shape_fn((6, FEATURE_COUNT), |(i, j)| ((i * 7 + j * 3) % 5) as f32);
        BackgroundData::from_rows(rows).unwrap()
    }

    fn linear_model() -> Arc<dyn RiskModel> {
        let coef = (0..FEATURE_COUNT).map(|j| 0.002 * (j as f32 - 10.0)).collect();
        Arc::new(Linear { bias: 0.5, coef })
    }

    fn instance(values: Vec<f32>) -> FeatureVector {
        FeatureVector::from_raw(values)
    }

    #[test]
    fn test_linear_model_exact_values() {
        let model = linear_model();
        let bg = background();
        let mean = bg.mean();
        let explainer = KernelExplainer::new(Arc::clone(&model), bg, ExplainerConfig::default()).unwrap();

        let x: Vec<f32> = (0..FEATURE_COUNT).map(|j| (j % 4) as f32 + 0.5).collect();
        let result = explainer.explain(&instance(x.clone())).unwrap();

        assert_eq!(result.len(), FEATURE_COUNT);
        for (j, c) in result.iter().enumerate() {
            let expected = 0.002 * (j as f64 - 10.0) * (f64::from(x[j]) - f64::from(mean[j]));
            assert_abs_diff_eq!(c.contribution, expected, epsilon = 1e-4);
            assert_eq!(c.feature, FEATURE_SCHEMA.names[j]);
        }
    }

    #[test]
    fn test_efficiency_for_nonlinear_model() {
        let coef: Vec<f64> = (0..FEATURE_COUNT).map(|j| 0.3 * ((j % 5) as f64 - 2.0)).collect();
        let model: Arc<dyn RiskModel> = Arc::new(LogisticModel::new(-0.2, coef));
        let explainer = KernelExplainer::new(Arc::clone(&model), background(), ExplainerConfig::default()).unwrap();

        let x = instance((0..FEATURE_COUNT).map(|j| (j % 3) as f32).collect());
        let result = explainer.explain(&x).unwrap();
        let fx = f64::from(model.predict_proba(x.to_batch().view()).unwrap()[[0, 1]]);
        assert_abs_diff_eq!(result.base_value() + result.total(), fx, epsilon = 1e-6);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let coef: Vec<f64> = (0..FEATURE_COUNT).map(|j| 0.1 * (j as f64 % 3.0)).collect();
        let model: Arc<dyn RiskModel> = Arc::new(LogisticModel::new(0.0, coef));
        let config = ExplainerConfig { nsamples: Some(200), ..Default::default() };
        let a = KernelExplainer::new(Arc::clone(&model), background(), config.clone()).unwrap();
        let b = KernelExplainer::new(Arc::clone(&model), background(), config).unwrap();

        let x = instance(vec![4.5; FEATURE_COUNT]);
        assert_eq!(a.explain(&x).unwrap(), b.explain(&x).unwrap());
    }

    #[test]
    fn test_non_varying_features_get_zero() {
        let model = linear_model();
        let rows = Array2::from_shape_fn((4, FEATURE_COUNT), |(i, j)| if j < 2 { i as f32 } else { 1.0 });
        let explainer =
            KernelExplainer::new(model, BackgroundData::from_rows(rows).unwrap(), ExplainerConfig::default())
                .unwrap();

        let all_same = explainer.explain(&instance(vec![1.0; FEATURE_COUNT])).unwrap();
        assert!(all_same.iter().skip(2).all(|c| c.contribution == 0.0));

        let mut x = vec![1.0; FEATURE_COUNT];
        x[5] = 3.0;
        x[0] = 1.0;
        x[1] = 1.0;
        let result = explainer.explain(&instance(x)).unwrap();
        assert!(result.iter().enumerate().all(|(j, c)| [0, 1, 5].contains(&j) || c.contribution == 0.0));
        assert_abs_diff_eq!(result.as_slice()[5].contribution, 0.002 * -5.0 * 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_single_varying_feature_takes_whole_difference() {
        let model = linear_model();
        let rows = Array2::from_elem((3, FEATURE_COUNT), 1.0f32);
        let explainer =
            KernelExplainer::new(Arc::clone(&model), BackgroundData::from_rows(rows).unwrap(), ExplainerConfig::default())
                .unwrap();
        let mut x = vec![1.0; FEATURE_COUNT];
        x[3] = 2.0;
        let result = explainer.explain(&instance(x)).unwrap();
        assert_abs_diff_eq!(result.as_slice()[3].contribution, 0.002 * -7.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total(), 0.002 * -7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wrong_width_is_inference_error() {
        let explainer = KernelExplainer::new(linear_model(), background(), ExplainerConfig::default()).unwrap();
        let err = explainer.explain(&instance(vec![0.0; 5])).unwrap_err();
        assert!(matches!(err, InferenceError::InputShape { expected, actual: 5 } if expected == FEATURE_COUNT));
    }

    #[test]
    fn test_sample_budget_below_two_is_rejected() {
        for nsamples in [0, 1] {
            let config: ExplainerConfig = toml::from_str(&format!("nsamples = {}", nsamples)).unwrap();
            match KernelExplainer::new(linear_model(), background(), config) {
                Err(ConfigError::Invalid { reason, .. }) => assert!(reason.contains("nsamples"), "{}", reason),
                other => panic!("expected invalid explainer config, got {:?}", other.map(|_| ())),
            }
        }
        let config = ExplainerConfig { nsamples: Some(MIN_SAMPLES), ..Default::default() };
        assert!(KernelExplainer::new(linear_model(), background(), config).is_ok());
    }

    #[test]
    fn test_no_coalitions_is_attribution_error() {
        let err = solve_constrained(&Coalitions::new(), &Array1::zeros(0), 0.1, 0.5).unwrap_err();
        assert!(matches!(err, InferenceError::Attribution(_)));
    }

    #[test]
    fn test_combinations() {
        let all: Vec<_> = Combinations::new(4, 2).collect();
        assert_eq!(all, vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]);
        assert_eq!(Combinations::new(3, 3).count(), 1);
        assert_eq!(Combinations::new(3, 4).count(), 0);
        assert_eq!(binomial(24, 3), 2024.0);
    }

    #[test]
    fn test_solve_linear() {
        let x = solve_linear(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
        assert_abs_diff_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.4, epsilon = 1e-12);
        assert!(solve_linear(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).is_none());
    }
}
