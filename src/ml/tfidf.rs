//! TF-IDF vectorizer for URL feature extraction.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, AnalyzerConfig};
use crate::error::{Result, UrlGuardError};
use crate::ml::vector::SparseVector;

/// TF-IDF vectorizer for URL feature extraction.
///
/// Fitting assigns every distinct token a column in lexicographic order, so
/// the same corpus and analyzer always produce the same vocabulary. Each
/// column's weight is the smoothed inverse document frequency
/// `ln((1 + N) / (1 + df)) + 1`; transformed vectors hold raw token counts
/// times IDF, scaled to unit length.
pub struct TfIdfVectorizer {
    /// Settings the analyzer was built from.
    config: AnalyzerConfig,
    /// Analyzer for tokenization.
    analyzer: Arc<dyn Analyzer>,
    /// Vocabulary: token -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Tokens in index order.
    terms: Vec<String>,
    /// Inverse document frequency for each token.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
}

/// The persisted form of a fitted [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub analyzer: AnalyzerConfig,
    pub terms: Vec<String>,
    pub idf: Vec<f64>,
    pub n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer using the given analyzer settings.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let analyzer = Arc::new(config.build()?);
        Ok(Self {
            config,
            analyzer,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
        })
    }

    /// Fit the vectorizer on training documents.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(UrlGuardError::data(
                "cannot fit vectorizer on an empty corpus",
            ));
        }

        // Count document frequencies; BTreeMap fixes the index order
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique_tokens: HashSet<String> = self.tokenize(doc.as_ref())?.into_iter().collect();
            for token in unique_tokens {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len();
        let mut terms = Vec::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (term, df) in document_frequency {
            terms.push(term);
            idf.push(smoothed_idf(n_documents, df));
        }

        if terms.is_empty() {
            return Err(UrlGuardError::data(format!(
                "analyzer '{}' produced no tokens from {n_documents} documents",
                self.analyzer.name()
            )));
        }

        self.vocabulary = index_terms(&terms);
        self.terms = terms;
        self.idf = idf;
        self.n_documents = n_documents;

        debug!(
            "fitted vectorizer: {} terms over {} documents",
            self.terms.len(),
            self.n_documents
        );

        Ok(())
    }

    /// Fit on the documents and return the TF-IDF vector of each, in order.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Transform a document into a TF-IDF feature vector.
    ///
    /// Tokens outside the fitted vocabulary are ignored.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(UrlGuardError::model(
                "vectorizer must be fitted before transform",
            ));
        }

        // Count term frequencies
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in self.tokenize(document)? {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        // Apply IDF
        let pairs = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let mut vector = SparseVector::from_pairs(self.terms.len(), pairs);
        vector.l2_normalize();
        Ok(vector)
    }

    /// Transform several documents.
    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Tokenize a document using the configured analyzer.
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyzer.analyze(text)?.map(|token| token.text).collect())
    }

    /// Whether `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        self.n_documents > 0
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Column index of a token, if it is in the vocabulary.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }

    /// Tokens in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Number of documents seen during fitting.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Analyzer settings.
    pub fn analyzer_config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Snapshot the fitted state for persistence.
    pub fn to_state(&self) -> VectorizerState {
        VectorizerState {
            analyzer: self.config.clone(),
            terms: self.terms.clone(),
            idf: self.idf.clone(),
            n_documents: self.n_documents,
        }
    }

    /// Rebuild a fitted vectorizer from persisted state.
    pub fn from_state(state: VectorizerState) -> Result<Self> {
        if state.terms.len() != state.idf.len() {
            return Err(UrlGuardError::serialization(format!(
                "vectorizer state has {} terms but {} idf weights",
                state.terms.len(),
                state.idf.len()
            )));
        }
        if state.n_documents == 0 || state.terms.is_empty() {
            return Err(UrlGuardError::serialization(
                "vectorizer state is not fitted",
            ));
        }

        let vocabulary = index_terms(&state.terms);
        if vocabulary.len() != state.terms.len() {
            return Err(UrlGuardError::serialization(
                "vectorizer state contains duplicate terms",
            ));
        }

        let mut vectorizer = Self::new(state.analyzer)?;
        vectorizer.vocabulary = vocabulary;
        vectorizer.terms = state.terms;
        vectorizer.idf = state.idf;
        vectorizer.n_documents = state.n_documents;
        Ok(vectorizer)
    }
}

fn smoothed_idf(n_documents: usize, df: usize) -> f64 {
    ((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0
}

fn index_terms(terms: &[String]) -> HashMap<String, usize> {
    terms
        .iter()
        .enumerate()
        .map(|(idx, term)| (term.clone(), idx))
        .collect()
}
