//! Inference over a saved artifact pair.
//!
//! [`UrlClassifier`] is the single boundary between the trained model and
//! everything that consumes it: give it a URL, get a label back.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::info;
use serde::{Deserialize, Serialize};

use crate::dataset::{BENIGN, Label};
use crate::error::{Result, UrlGuardError};
use crate::ml::artifact::{ArtifactPair, ModelMetadata};
use crate::ml::naive_bayes::MultinomialNaiveBayes;
use crate::ml::tfidf::TfIdfVectorizer;

/// Binary reading of a predicted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Safe,
    Malicious,
}

impl Prediction {
    /// The benign label is safe; any other label is malicious.
    pub fn from_label(label: Label) -> Self {
        if label == BENIGN {
            Prediction::Safe
        } else {
            Prediction::Malicious
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Safe => write!(f, "SAFE"),
            Prediction::Malicious => write!(f, "MALICIOUS"),
        }
    }
}

/// A fitted vectorizer and model, ready to classify URLs.
#[derive(Debug)]
pub struct UrlClassifier {
    vectorizer: TfIdfVectorizer,
    model: MultinomialNaiveBayes,
    metadata: Option<ModelMetadata>,
}

impl UrlClassifier {
    /// Combine a vectorizer and model; their dimensions must agree.
    pub fn new(vectorizer: TfIdfVectorizer, model: MultinomialNaiveBayes) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(UrlGuardError::model("vectorizer is not fitted"));
        }
        if vectorizer.vocabulary_size() != model.n_features() {
            return Err(UrlGuardError::mismatch(format!(
                "vectorizer has {} features but model expects {}",
                vectorizer.vocabulary_size(),
                model.n_features()
            )));
        }
        Ok(UrlClassifier {
            vectorizer,
            model,
            metadata: None,
        })
    }

    /// Load the artifact pair saved in `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::from_artifacts(ArtifactPair::load(dir)?)
    }

    pub fn from_artifacts(pair: ArtifactPair) -> Result<Self> {
        let (vectorizer, artifact) = pair.into_parts();
        let mut classifier = Self::new(vectorizer, artifact.model)?;
        classifier.metadata = Some(artifact.metadata);
        Ok(classifier)
    }

    /// Predicted label for a URL.
    pub fn predict(&self, url: &str) -> Result<Label> {
        let features = self.vectorizer.transform(url)?;
        self.model.predict(&features)
    }

    /// Posterior probability per class, paired with the class label.
    pub fn predict_proba(&self, url: &str) -> Result<Vec<(Label, f64)>> {
        let features = self.vectorizer.transform(url)?;
        let proba = self.model.predict_proba(&features)?;
        Ok(self.model.classes().iter().copied().zip(proba).collect())
    }

    pub fn verdict(&self, url: &str) -> Result<Prediction> {
        self.predict(url).map(Prediction::from_label)
    }

    pub fn classes(&self) -> &[Label] {
        self.model.classes()
    }

    /// Training metadata, when loaded from saved artifacts.
    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}

static GLOBAL: OnceLock<Arc<UrlClassifier>> = OnceLock::new();

/// Load the process-wide classifier from `dir` once.
///
/// Later calls return the classifier that is already loaded, whatever
/// directory they name.
pub fn init_global<P: AsRef<Path>>(dir: P) -> Result<Arc<UrlClassifier>> {
    if let Some(classifier) = GLOBAL.get() {
        return Ok(Arc::clone(classifier));
    }
    let loaded = Arc::new(UrlClassifier::load(dir.as_ref())?);
    info!("loaded classifier from {}", dir.as_ref().display());
    Ok(Arc::clone(GLOBAL.get_or_init(|| loaded)))
}

/// The process-wide classifier, if [`init_global`] has succeeded.
pub fn global() -> Option<Arc<UrlClassifier>> {
    GLOBAL.get().cloned()
}
