//! Multinomial naive Bayes over TF-IDF features.
//!
//! Each class `c` gets a prior `ln(n_c / n)` and, per feature `j`, a
//! smoothed log-likelihood
//!
//! ```text
//! ln((N_cj + alpha) / (N_c + alpha * n_features))
//! ```
//!
//! where `N_cj` is the summed weight of feature `j` over rows of class `c`.
//! A vector is assigned the class with the highest joint log-likelihood;
//! ties go to the smaller label.

use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{Result, UrlGuardError};
use crate::ml::vector::SparseVector;

/// A fitted multinomial naive Bayes classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    /// Additive smoothing strength.
    alpha: f64,
    /// Sorted class labels.
    classes: Vec<Label>,
    /// Training rows per class.
    class_count: Vec<usize>,
    /// Log prior per class.
    class_log_prior: Vec<f64>,
    /// Log-likelihood per class, per feature.
    feature_log_prob: Vec<Vec<f64>>,
    /// Expected vector dimension.
    n_features: usize,
}

impl MultinomialNaiveBayes {
    /// Fit a classifier on feature vectors `x` with labels `y`.
    pub fn fit(x: &[SparseVector], y: &[Label], alpha: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(UrlGuardError::config(format!(
                "smoothing alpha must be positive, got {alpha}"
            )));
        }
        if x.is_empty() {
            return Err(UrlGuardError::data("cannot fit classifier on zero rows"));
        }
        if x.len() != y.len() {
            return Err(UrlGuardError::data(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].dimension();
        let mut classes: Vec<Label> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0f64; n_features]; classes.len()];

        for (row, (features, label)) in x.iter().zip(y).enumerate() {
            if features.dimension() != n_features {
                return Err(UrlGuardError::mismatch(format!(
                    "row {row} has dimension {}, expected {n_features}",
                    features.dimension()
                )));
            }
            // classes is built from y, so the label is always present
            let c = classes.binary_search(label).unwrap_or_default();
            class_count[c] += 1;
            for (j, value) in features.iter() {
                if value < 0.0 {
                    return Err(UrlGuardError::data(format!(
                        "row {row} has negative feature value {value} at column {j}"
                    )));
                }
                feature_count[c][j] += value;
            }
        }

        let n_rows = x.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64 / n_rows).ln())
            .collect();

        let feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + alpha * n_features as f64;
                let log_total = total.ln();
                counts
                    .into_iter()
                    .map(|count| (count + alpha).ln() - log_total)
                    .collect()
            })
            .collect();

        Ok(Self {
            alpha,
            classes,
            class_count,
            class_log_prior,
            feature_log_prob,
            n_features,
        })
    }

    /// Joint log-likelihood of `x` under each class, in [`classes`](Self::classes) order.
    pub fn joint_log_likelihood(&self, x: &SparseVector) -> Result<Vec<f64>> {
        if x.dimension() != self.n_features {
            return Err(UrlGuardError::mismatch(format!(
                "feature vector has dimension {}, model expects {}",
                x.dimension(),
                self.n_features
            )));
        }

        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_prob)| prior + x.dot_dense(log_prob))
            .collect())
    }

    /// Predict the most likely label.
    pub fn predict(&self, x: &SparseVector) -> Result<Label> {
        let jll = self.joint_log_likelihood(x)?;
        let mut best = 0;
        for (c, &score) in jll.iter().enumerate().skip(1) {
            if score > jll[best] {
                best = c;
            }
        }
        Ok(self.classes[best])
    }

    /// Predict labels for several vectors.
    pub fn predict_batch(&self, x: &[SparseVector]) -> Result<Vec<Label>> {
        x.iter().map(|row| self.predict(row)).collect()
    }

    /// Posterior probability per class, in [`classes`](Self::classes) order.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<Vec<f64>> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + jll.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
        Ok(jll.into_iter().map(|v| (v - log_norm).exp()).collect())
    }

    /// Mean accuracy on the given rows.
    pub fn score(&self, x: &[SparseVector], y: &[Label]) -> Result<f64> {
        if x.len() != y.len() {
            return Err(UrlGuardError::data(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let predictions = self.predict_batch(x)?;
        Ok(crate::ml::metrics::accuracy(y, &predictions))
    }

    /// Smoothing strength the model was fitted with.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Sorted class labels seen during fitting.
    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    /// Training rows per class.
    pub fn class_count(&self) -> &[usize] {
        &self.class_count
    }

    /// Log prior per class.
    pub fn class_log_prior(&self) -> &[f64] {
        &self.class_log_prior
    }

    /// Log-likelihood matrix, one row per class.
    pub fn feature_log_prob(&self) -> &[Vec<f64>] {
        &self.feature_log_prob
    }

    /// Expected feature vector dimension.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Check internal shape consistency of deserialized parameters.
    pub fn validate(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(UrlGuardError::serialization("model has no classes"));
        }
        if !self.classes.windows(2).all(|w| w[0] < w[1]) {
            return Err(UrlGuardError::serialization(
                "model classes are not strictly increasing",
            ));
        }
        if self.class_count.len() != n_classes
            || self.class_log_prior.len() != n_classes
            || self.feature_log_prob.len() != n_classes
        {
            return Err(UrlGuardError::serialization(format!(
                "model parameter shapes disagree with {n_classes} classes"
            )));
        }
        if let Some(row) = self
            .feature_log_prob
            .iter()
            .position(|row| row.len() != self.n_features)
        {
            return Err(UrlGuardError::serialization(format!(
                "feature_log_prob row {row} does not have {} columns",
                self.n_features
            )));
        }
        Ok(())
    }
}
