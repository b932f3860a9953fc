//! # urlguard
//!
//! URL phishing detection: a TF-IDF + multinomial naive Bayes classifier
//! trained from labeled URLs, and a layered scanner that combines it with
//! DNS, heuristic and reachability checks.
//!
//! ## Features
//!
//! - Configurable URL tokenization (word tokens or character n-grams)
//! - Stratified train/test split and cross-validated smoothing search
//! - Checksummed, atomically written model artifacts
//! - Async scanner with a pluggable network probe

pub mod analysis;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod inference;
pub mod ml;
pub mod scanner;

pub mod prelude {
    pub use crate::dataset::{Dataset, Label, Sample};
    pub use crate::error::{Result, UrlGuardError};
    pub use crate::inference::{Prediction, UrlClassifier};
    pub use crate::ml::{ArtifactPair, Trainer, TrainingConfig};
    pub use crate::scanner::{ScanPolicy, ScanVerdict, Scanner};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
