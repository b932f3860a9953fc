//! URL classification model: feature extraction, training and persistence.
//!
//! The pieces compose into a single pipeline driven by [`Trainer`]:
//!
//! ```text
//! Dataset → TfIdfVectorizer → stratified split → GridSearch (k-fold)
//!         → MultinomialNaiveBayes → EvaluationReport → ArtifactPair
//! ```

pub mod artifact;
pub mod config;
pub mod metrics;
pub mod naive_bayes;
pub mod search;
pub mod split;
pub mod tfidf;
pub mod trainer;
pub mod vector;

pub use artifact::{ArtifactPair, MODEL_FILE, ModelArtifact, ModelMetadata, VECTORIZER_FILE};
pub use config::TrainingConfig;
pub use metrics::{ClassificationReport, ConfusionMatrix, EvaluationReport, accuracy};
pub use naive_bayes::MultinomialNaiveBayes;
pub use search::{CandidateScore, GridSearch, GridSearchResult};
pub use split::{Fold, TrainTestSplit, stratified_k_fold, stratified_train_test_split};
pub use tfidf::{TfIdfVectorizer, VectorizerState};
pub use trainer::{Trainer, TrainingOutcome};
pub use vector::SparseVector;
