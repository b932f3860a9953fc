//! Cross-validated grid search over the naive Bayes smoothing strength.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dataset::Label;
use crate::error::{Result, UrlGuardError};
use crate::ml::config::TrainingConfig;
use crate::ml::naive_bayes::MultinomialNaiveBayes;
use crate::ml::split::{Fold, stratified_k_fold};
use crate::ml::vector::SparseVector;

/// Cross-validation outcome for one candidate alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub alpha: f64,
    /// Mean of `fold_scores`, or 0 when cross-validation was skipped.
    pub mean_score: f64,
    /// Held-out accuracy per fold, in fold order.
    pub fold_scores: Vec<f64>,
}

/// Result of a grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub best_alpha: f64,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

impl GridSearchResult {
    /// False when there were too few rows to cross-validate and the first
    /// candidate was taken as is.
    pub fn is_cross_validated(&self) -> bool {
        self.candidates.iter().any(|c| !c.fold_scores.is_empty())
    }
}

/// Exhaustive search over candidate alphas scored by k-fold accuracy.
#[derive(Debug, Clone)]
pub struct GridSearch {
    alphas: Vec<f64>,
    folds: usize,
    parallel: bool,
}

impl GridSearch {
    pub fn new(alphas: Vec<f64>, folds: usize) -> Self {
        GridSearch {
            alphas,
            folds,
            parallel: true,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        GridSearch::new(config.alphas.clone(), config.folds).with_parallel(config.parallel_folds)
    }

    /// Score folds on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    /// Run the search on training rows.
    ///
    /// The fold count is capped at the number of rows. With fewer than two
    /// rows no fold can be held out, so the first candidate is returned.
    /// Candidates are compared in order and only a strictly better mean
    /// replaces the current best.
    pub fn run(&self, x: &[SparseVector], y: &[Label]) -> Result<GridSearchResult> {
        let Some(&first) = self.alphas.first() else {
            return Err(UrlGuardError::config("grid search needs at least one alpha"));
        };
        if x.len() != y.len() {
            return Err(UrlGuardError::data(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }

        let k = self.folds.min(y.len());
        if k < 2 {
            warn!(
                "only {} training row(s); skipping cross-validation and using alpha={first}",
                y.len()
            );
            return Ok(GridSearchResult {
                best_alpha: first,
                best_score: 0.0,
                candidates: self
                    .alphas
                    .iter()
                    .map(|&alpha| CandidateScore {
                        alpha,
                        mean_score: 0.0,
                        fold_scores: Vec::new(),
                    })
                    .collect(),
            });
        }
        if k < self.folds {
            warn!(
                "requested {} folds but only {} training rows; using {k} folds",
                self.folds,
                y.len()
            );
        }

        let folds = stratified_k_fold(y, k)?;
        let mut candidates = Vec::with_capacity(self.alphas.len());
        let mut best: Option<(f64, f64)> = None;

        for &alpha in &self.alphas {
            let fold_scores = self.score_folds(x, y, &folds, alpha)?;
            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            debug!("alpha={alpha}: mean accuracy {mean_score:.4} over {k} folds");

            match best {
                Some((_, score)) if mean_score <= score => {}
                _ => best = Some((alpha, mean_score)),
            }
            candidates.push(CandidateScore {
                alpha,
                mean_score,
                fold_scores,
            });
        }

        let (best_alpha, best_score) = best.unwrap_or((first, 0.0));
        Ok(GridSearchResult {
            best_alpha,
            best_score,
            candidates,
        })
    }

    fn score_folds(
        &self,
        x: &[SparseVector],
        y: &[Label],
        folds: &[Fold],
        alpha: f64,
    ) -> Result<Vec<f64>> {
        // collect keeps fold order either way
        if self.parallel {
            folds
                .par_iter()
                .map(|fold| score_fold(x, y, fold, alpha))
                .collect()
        } else {
            folds
                .iter()
                .map(|fold| score_fold(x, y, fold, alpha))
                .collect()
        }
    }
}

fn score_fold(x: &[SparseVector], y: &[Label], fold: &Fold, alpha: f64) -> Result<f64> {
    let train_x: Vec<SparseVector> = fold.train.iter().map(|&i| x[i].clone()).collect();
    let train_y: Vec<Label> = fold.train.iter().map(|&i| y[i]).collect();
    let model = MultinomialNaiveBayes::fit(&train_x, &train_y, alpha)?;

    let test_x: Vec<SparseVector> = fold.test.iter().map(|&i| x[i].clone()).collect();
    let test_y: Vec<Label> = fold.test.iter().map(|&i| y[i]).collect();
    model.score(&test_x, &test_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<SparseVector>, Vec<Label>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            let noise = (i % 3) as f64 * 0.1;
            x.push(SparseVector::from_dense(&[1.0, noise, 0.0]));
            y.push(0);
            x.push(SparseVector::from_dense(&[0.0, noise, 1.0]));
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_selects_from_candidates() {
        let (x, y) = separable();
        let result = GridSearch::new(vec![0.1, 0.5, 1.0], 5).run(&x, &y).unwrap();

        assert!([0.1, 0.5, 1.0].contains(&result.best_alpha));
        assert_eq!(result.candidates.len(), 3);
        assert!(result.candidates.iter().all(|c| c.fold_scores.len() == 5));
        assert!(result.is_cross_validated());
        // perfectly separable: every alpha scores 1, so the first wins the tie
        assert_eq!(result.best_score, 1.0);
        assert_eq!(result.best_alpha, 0.1);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let (x, y) = separable();
        let search = GridSearch::new(vec![0.1, 0.5, 1.0], 4);
        let parallel = search.clone().with_parallel(true).run(&x, &y).unwrap();
        let sequential = search.with_parallel(false).run(&x, &y).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_fold_count_capped_by_rows() {
        let x = vec![
            SparseVector::from_dense(&[1.0, 0.0]),
            SparseVector::from_dense(&[0.0, 1.0]),
            SparseVector::from_dense(&[1.0, 0.0]),
        ];
        let y = vec![0, 1, 0];
        let result = GridSearch::new(vec![1.0], 5).run(&x, &y).unwrap();
        assert_eq!(result.candidates[0].fold_scores.len(), 3);
    }

    #[test]
    fn test_single_row_skips_cross_validation() {
        let x = vec![SparseVector::from_dense(&[1.0])];
        let result = GridSearch::new(vec![0.5, 1.0], 5).run(&x, &[0]).unwrap();
        assert_eq!(result.best_alpha, 0.5);
        assert!(!result.is_cross_validated());
    }

    #[test]
    fn test_empty_alphas() {
        let (x, y) = separable();
        assert!(matches!(
            GridSearch::new(vec![], 5).run(&x, &y),
            Err(UrlGuardError::Config(_))
        ));
    }
}
