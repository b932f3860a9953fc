//! Training configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::AnalyzerConfig;
use crate::error::{Result, UrlGuardError};

/// Smoothing strengths tried by the grid search unless configured otherwise.
pub const DEFAULT_ALPHAS: [f64; 3] = [0.1, 0.5, 1.0];

/// Settings for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    /// Seed for the stratified shuffle.
    pub seed: u64,
    /// Requested number of cross-validation folds.
    pub folds: usize,
    /// Candidate smoothing strengths, tried in order.
    pub alphas: Vec<f64>,
    /// Tokenization used by the vectorizer.
    pub analyzer: AnalyzerConfig,
    /// Score cross-validation folds on the rayon pool.
    pub parallel_folds: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            test_size: 0.2,
            seed: 42,
            folds: 5,
            alphas: DEFAULT_ALPHAS.to_vec(),
            analyzer: AnalyzerConfig::default(),
            parallel_folds: true,
        }
    }
}

impl TrainingConfig {
    /// Read a configuration from a JSON file; missing keys take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            UrlGuardError::config(format!(
                "failed to open training config {}: {e}",
                path.display()
            ))
        })?;
        let config: TrainingConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Self {
        self.alphas = alphas;
        self
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_parallel_folds(mut self, parallel: bool) -> Self {
        self.parallel_folds = parallel;
        self
    }

    /// Reject settings that cannot produce a model.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(UrlGuardError::config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.folds < 2 {
            return Err(UrlGuardError::config(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        if self.alphas.is_empty() {
            return Err(UrlGuardError::config("alphas must not be empty"));
        }
        if let Some(alpha) = self
            .alphas
            .iter()
            .find(|a| !(a.is_finite() && **a > 0.0))
        {
            return Err(UrlGuardError::config(format!(
                "alphas must be positive, got {alpha}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.folds, 5);
        assert_eq!(config.alphas, vec![0.1, 0.5, 1.0]);
        assert!(config.parallel_folds);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = TrainingConfig::default();
        assert!(base.clone().with_test_size(0.0).validate().is_err());
        assert!(base.clone().with_test_size(1.0).validate().is_err());
        assert!(base.clone().with_folds(1).validate().is_err());
        assert!(base.clone().with_alphas(vec![]).validate().is_err());

        let err = base.with_alphas(vec![0.5, -1.0]).validate().unwrap_err();
        assert!(matches!(err, UrlGuardError::Config(msg) if msg.contains("-1")));
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"seed": 7, "analyzer": {{"char_ngram": {{"min_gram": 3, "max_gram": 5, "lowercase": true}}}}}}"#
        )
        .unwrap();

        let config = TrainingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.folds, 5);
        assert_eq!(config.analyzer, AnalyzerConfig::char_ngrams(3, 5));
    }

    #[test]
    fn test_from_json_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"folds": 1}}"#).unwrap();
        assert!(matches!(
            TrainingConfig::from_json_file(file.path()),
            Err(UrlGuardError::Config(_))
        ));
    }
}
