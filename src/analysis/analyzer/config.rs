//! Serializable analyzer settings.
//!
//! A fitted vectorizer must tokenize inference-time URLs exactly as it did
//! during training, so the analyzer is persisted as this description and
//! rebuilt on load rather than stored as a trait object.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::PipelineAnalyzer;
use crate::analysis::token_filter::LowercaseFilter;
use crate::analysis::tokenizer::regex::DEFAULT_TOKEN_PATTERN;
use crate::analysis::tokenizer::{NgramTokenizer, RegexTokenizer};
use crate::error::Result;

/// Description of the analysis pipeline used for feature extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerConfig {
    /// Word tokens extracted by a regex.
    Word {
        /// Token regex.
        pattern: String,
        /// Lowercase tokens after extraction.
        lowercase: bool,
    },
    /// Overlapping character n-grams over the whole URL.
    CharNgram {
        /// Smallest n-gram length.
        min_gram: usize,
        /// Largest n-gram length.
        max_gram: usize,
        /// Lowercase tokens after extraction.
        lowercase: bool,
    },
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig::Word {
            pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            lowercase: true,
        }
    }
}

impl AnalyzerConfig {
    /// Character n-gram configuration with lowercasing.
    pub fn char_ngrams(min_gram: usize, max_gram: usize) -> Self {
        AnalyzerConfig::CharNgram {
            min_gram,
            max_gram,
            lowercase: true,
        }
    }

    /// Build the analyzer this configuration describes.
    pub fn build(&self) -> Result<PipelineAnalyzer> {
        let (analyzer, lowercase) = match self {
            AnalyzerConfig::Word { pattern, lowercase } => (
                PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_pattern(pattern)?))
                    .with_name("url_word"),
                *lowercase,
            ),
            AnalyzerConfig::CharNgram {
                min_gram,
                max_gram,
                lowercase,
            } => (
                PipelineAnalyzer::new(Arc::new(NgramTokenizer::new(*min_gram, *max_gram)?))
                    .with_name(format!("url_char_{min_gram}_{max_gram}")),
                *lowercase,
            ),
        };

        Ok(if lowercase {
            analyzer.add_filter(Arc::new(LowercaseFilter::new()))
        } else {
            analyzer
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::Analyzer;

    #[test]
    fn test_default_is_lowercased_words() {
        let analyzer = AnalyzerConfig::default().build().unwrap();
        let tokens: Vec<String> = analyzer
            .analyze("HTTP://Secure-Account-Update.RU")
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(tokens, vec!["http", "secure", "account", "update", "ru"]);
        assert_eq!(analyzer.name(), "url_word");
    }

    #[test]
    fn test_char_ngram_build() {
        let analyzer = AnalyzerConfig::char_ngrams(3, 3).build().unwrap();
        let tokens: Vec<String> = analyzer.analyze("ABCD").unwrap().map(|t| t.text).collect();

        assert_eq!(tokens, vec!["abc", "bcd"]);
    }

    #[test]
    fn test_invalid_config_fails_to_build() {
        assert!(AnalyzerConfig::char_ngrams(0, 2).build().is_err());
        let bad = AnalyzerConfig::Word {
            pattern: "[".to_string(),
            lowercase: false,
        };
        assert!(bad.build().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AnalyzerConfig::char_ngrams(2, 4);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("char_ngram"));
        let back: AnalyzerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
