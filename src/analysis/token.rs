//! Token types for URL text analysis.
//!
//! Tokens are the units that flow from a tokenizer through the filter chain
//! and finally into the TF-IDF vocabulary. Offsets refer to byte positions
//! in the analyzed URL string.
//!
//! # Examples
//!
//! ```
//! use urlguard::analysis::token::Token;
//!
//! let token = Token::with_offsets("login", 1, 11, 16);
//! assert_eq!(token.text, "login");
//! assert_eq!(token.start_offset, 11);
//! assert_eq!(token.end_offset, 16);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A token represents a single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Copy this token with replaced text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Token {
            text: text.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("secure", 0);
        assert_eq!(token.text, "secure");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert_eq!(token.len(), 6);
        assert!(!token.is_empty());
    }

    #[test]
    fn test_with_text_keeps_offsets() {
        let token = Token::with_offsets("LOGIN", 2, 7, 12).with_text("login");
        assert_eq!(token.text, "login");
        assert_eq!(token.position, 2);
        assert_eq!(token.start_offset, 7);
        assert_eq!(token.end_offset, 12);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new("verify", 0);
        assert_eq!(format!("{token}"), "verify");
    }
}
