//! Text analysis for URL feature extraction.
//!
//! A URL passes through a tokenizer and then a chain of token filters; the
//! resulting token texts are what the TF-IDF vectorizer counts.
//!
//! ```text
//! URL → Tokenizer → Lowercase → tokens
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, AnalyzerConfig, PipelineAnalyzer};
pub use token::{Token, TokenStream};
pub use token_filter::{Filter, LowercaseFilter};
pub use tokenizer::{NgramTokenizer, RegexTokenizer, Tokenizer};
