//! Core analyzer trait definition.
//!
//! Analyzers combine a tokenizer with filters to turn a raw URL into the
//! token texts counted by the vectorizer.
//!
//! ```text
//! Raw URL → Analyzer → Token Stream → Vocabulary lookup
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1..N
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so a fitted vectorizer can be shared
/// across cross-validation workers and scanner tasks.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and logging).
    fn name(&self) -> &str;
}
