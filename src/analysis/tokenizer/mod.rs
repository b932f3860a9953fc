//! Tokenizer implementations for URL analysis.
//!
//! - [`RegexTokenizer`] extracts word-like runs (`\b\w\w+\b` by default), so
//!   `http://secure-account.ru/login` yields `http`, `secure`, `account`,
//!   `ru`, `login`.
//! - [`NgramTokenizer`] emits overlapping character n-grams, which catch
//!   obfuscated hostnames that word tokens miss.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod ngram;
pub mod regex;

pub use ngram::NgramTokenizer;
pub use regex::RegexTokenizer;
