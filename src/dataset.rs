//! Labeled URL datasets.
//!
//! Training data is a CSV file whose header names at least a `url` and a
//! `label` column; any other columns are ignored:
//!
//! ```csv
//! url,label,source
//! http://good.com,0,alexa
//! http://bad-login-verify.com,1,phishtank
//! ```
//!
//! Loading validates in a fixed order so that the cheapest, most actionable
//! problem is reported first: missing columns (configuration error), then
//! per-row nulls and unparsable labels, then empty data and the number of
//! label classes (data errors). Nothing is vectorized until all of these pass.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UrlGuardError};

/// Name of the column holding URLs.
pub const URL_COLUMN: &str = "url";

/// Name of the column holding class labels.
pub const LABEL_COLUMN: &str = "label";

/// Class label, either [`BENIGN`] or [`MALICIOUS`].
pub type Label = i64;

/// The benign label.
pub const BENIGN: Label = 0;

/// The malicious label.
pub const MALICIOUS: Label = 1;

/// The label set every dataset must carry, in sorted order.
pub const CLASSES: [Label; 2] = [BENIGN, MALICIOUS];

/// A single labeled URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub url: String,
    pub label: Label,
}

impl Sample {
    /// Create a new sample.
    pub fn new<S: Into<String>>(url: S, label: Label) -> Self {
        Sample {
            url: url.into(),
            label,
        }
    }
}

/// A validated, non-empty set of samples with exactly two label classes.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<Sample>,
    labels: Vec<Label>,
}

impl Dataset {
    /// Build a dataset from samples, checking that it is non-empty and binary.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(UrlGuardError::data("dataset contains no rows"));
        }

        let mut labels: Vec<Label> = samples.iter().map(|s| s.label).collect();
        labels.sort_unstable();
        labels.dedup();

        match labels.len() {
            2 => {}
            n if n < 2 => {
                return Err(UrlGuardError::data(format!(
                    "column '{LABEL_COLUMN}' has {n} distinct value(s) {labels:?}; \
                     at least two classes are required"
                )));
            }
            n => {
                return Err(UrlGuardError::data(format!(
                    "column '{LABEL_COLUMN}' has {n} distinct values {labels:?}; \
                     the classifier is binary and needs exactly two"
                )));
            }
        }
        if labels != CLASSES {
            return Err(UrlGuardError::data(format!(
                "column '{LABEL_COLUMN}' has values {labels:?}; \
                 expected {BENIGN} (benign) and {MALICIOUS} (malicious)"
            )));
        }

        Ok(Dataset { samples, labels })
    }

    /// Load a dataset from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            UrlGuardError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open dataset {}: {e}", path.display()),
            ))
        })?;
        let dataset = Self::from_csv_reader(file)?;
        debug!(
            "loaded {} samples from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a dataset from any CSV reader.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                UrlGuardError::config(format!(
                    "dataset must contain '{URL_COLUMN}' and '{LABEL_COLUMN}' columns; \
                     missing '{name}' (found: {})",
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })
        };
        let url_idx = column(URL_COLUMN)?;
        let label_idx = column(LABEL_COLUMN)?;

        let mut samples = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let row = row + 1;

            let url = match record.get(url_idx) {
                Some(url) if !url.is_empty() => url,
                _ => {
                    return Err(UrlGuardError::data(format!(
                        "row {row}: field '{URL_COLUMN}' is empty"
                    )));
                }
            };
            let label = match record.get(label_idx) {
                Some(label) if !label.is_empty() => parse_label(label).ok_or_else(|| {
                    UrlGuardError::data(format!(
                        "row {row}: field '{LABEL_COLUMN}' value '{label}' is not an integer"
                    ))
                })?,
                _ => {
                    return Err(UrlGuardError::data(format!(
                        "row {row}: field '{LABEL_COLUMN}' is empty"
                    )));
                }
            };

            samples.push(Sample::new(url, label));
        }

        Self::from_samples(samples)
    }

    /// All samples in file order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a validated dataset.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// URLs in sample order.
    pub fn urls(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.url.clone()).collect()
    }

    /// Labels in sample order.
    pub fn targets(&self) -> Vec<Label> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Sorted unique labels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of samples per label.
    pub fn class_counts(&self) -> BTreeMap<Label, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label).or_insert(0) += 1;
        }
        counts
    }
}

/// Integer labels, also accepting integral floats such as `1.0`.
fn parse_label(value: &str) -> Option<Label> {
    if let Ok(label) = value.parse::<Label>() {
        return Some(label);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as Label),
        _ => None,
    }
}
