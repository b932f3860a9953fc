//! End-to-end training: vectorize, split, search, refit, evaluate.

use chrono::Utc;
use log::{debug, info};

use crate::dataset::{Dataset, Label};
use crate::error::Result;
use crate::ml::artifact::{ArtifactPair, ModelArtifact, ModelMetadata};
use crate::ml::config::TrainingConfig;
use crate::ml::metrics::EvaluationReport;
use crate::ml::naive_bayes::MultinomialNaiveBayes;
use crate::ml::search::{GridSearch, GridSearchResult};
use crate::ml::split::{TrainTestSplit, stratified_train_test_split};
use crate::ml::tfidf::TfIdfVectorizer;
use crate::ml::vector::SparseVector;

/// Everything produced by one training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub vectorizer: TfIdfVectorizer,
    pub model: MultinomialNaiveBayes,
    pub split: TrainTestSplit,
    pub search: GridSearchResult,
    pub evaluation: EvaluationReport,
    pub metadata: ModelMetadata,
}

impl TrainingOutcome {
    /// Bundle the fitted vectorizer and model for saving.
    pub fn into_artifacts(self) -> Result<ArtifactPair> {
        ArtifactPair::new(
            self.vectorizer,
            ModelArtifact {
                model: self.model,
                metadata: self.metadata,
            },
        )
    }
}

/// Runs the training pipeline with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train and evaluate a classifier on `dataset`.
    ///
    /// The vectorizer is fitted on every URL, then the rows are split into
    /// train and test sets. The smoothing strength is picked by
    /// cross-validation on the training rows only, the final model is refit
    /// on all training rows, and the held-out rows are used for evaluation.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingOutcome> {
        info!(
            "training on {} samples, class counts {:?}",
            dataset.len(),
            dataset.class_counts()
        );

        let mut vectorizer = TfIdfVectorizer::new(self.config.analyzer.clone())?;
        let features = vectorizer.fit_transform(&dataset.urls())?;
        debug!("vocabulary size {}", vectorizer.vocabulary_size());

        let targets = dataset.targets();
        let split = stratified_train_test_split(&targets, self.config.test_size, self.config.seed)?;
        let (train_x, train_y) = select(&features, &targets, &split.train);
        let (test_x, test_y) = select(&features, &targets, &split.test);
        info!("split into {} train / {} test rows", train_y.len(), test_y.len());

        let search = GridSearch::from_config(&self.config).run(&train_x, &train_y)?;
        info!(
            "selected alpha={} (cv accuracy {:.4})",
            search.best_alpha, search.best_score
        );

        let model = MultinomialNaiveBayes::fit(&train_x, &train_y, search.best_alpha)?;
        let predictions = model.predict_batch(&test_x)?;
        let evaluation = EvaluationReport::new(&test_y, &predictions, dataset.labels());
        info!("held-out accuracy {:.4}", evaluation.accuracy);

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            n_train: train_y.len(),
            n_test: test_y.len(),
            test_accuracy: evaluation.accuracy,
            cv_score: search.is_cross_validated().then_some(search.best_score),
        };

        Ok(TrainingOutcome {
            vectorizer,
            model,
            split,
            search,
            evaluation,
            metadata,
        })
    }
}

fn select(x: &[SparseVector], y: &[Label], rows: &[usize]) -> (Vec<SparseVector>, Vec<Label>) {
    rows.iter().map(|&row| (x[row].clone(), y[row])).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Sample;

    fn dataset() -> Dataset {
        let mut samples = Vec::new();
        for i in 0..20 {
            samples.push(Sample::new(format!("http://shop{i}.example.com/home"), 0));
            samples.push(Sample::new(
                format!("http://secure-login-verify{i}.ru/account/update"),
                1,
            ));
        }
        Dataset::from_samples(samples).unwrap()
    }

    #[test]
    fn test_train_end_to_end() {
        let trainer = Trainer::new(TrainingConfig::default()).unwrap();
        let outcome = trainer.train(&dataset()).unwrap();

        assert_eq!(outcome.split.test.len(), 8);
        assert_eq!(outcome.split.train.len(), 32);
        assert!([0.1, 0.5, 1.0].contains(&outcome.search.best_alpha));
        assert_eq!(outcome.model.alpha(), outcome.search.best_alpha);
        assert_eq!(outcome.evaluation.accuracy, 1.0);
        assert_eq!(outcome.metadata.n_test, 8);
        assert_eq!(outcome.metadata.cv_score, Some(1.0));
        assert_eq!(
            outcome.model.n_features(),
            outcome.vectorizer.vocabulary_size()
        );
    }

    #[test]
    fn test_training_is_deterministic() {
        let trainer = Trainer::new(TrainingConfig::default()).unwrap();
        let a = trainer.train(&dataset()).unwrap();
        let b = trainer.train(&dataset()).unwrap();

        assert_eq!(a.split, b.split);
        assert_eq!(a.search, b.search);
        assert_eq!(a.model, b.model);
        assert_eq!(a.vectorizer.to_state(), b.vectorizer.to_state());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TrainingConfig::default().with_folds(0);
        assert!(Trainer::new(config).is_err());
    }

    #[test]
    fn test_into_artifacts() {
        let trainer = Trainer::new(TrainingConfig::default()).unwrap();
        let pair = trainer.train(&dataset()).unwrap().into_artifacts().unwrap();
        assert_eq!(pair.model().metadata.n_train, 32);
    }
}
