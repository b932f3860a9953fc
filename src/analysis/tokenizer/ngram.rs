//! Character n-gram tokenizer implementation.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, UrlGuardError};

/// A tokenizer that generates character n-grams.
///
/// # Examples
///
/// ```
/// use urlguard::analysis::tokenizer::ngram::NgramTokenizer;
/// use urlguard::analysis::tokenizer::Tokenizer;
///
/// let tokenizer = NgramTokenizer::new(2, 3).unwrap();
/// let tokens: Vec<_> = tokenizer.tokenize("abc").unwrap()
///     .map(|t| t.text.to_string())
///     .collect();
/// assert_eq!(tokens, vec!["ab", "abc", "bc"]);
/// ```
#[derive(Clone, Debug)]
pub struct NgramTokenizer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
}

impl NgramTokenizer {
    /// Create a new n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram` is 0 or `max_gram` is less than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(UrlGuardError::analysis("min_gram must be at least 1"));
        }
        if max_gram < min_gram {
            return Err(UrlGuardError::analysis(format!(
                "max_gram ({max_gram}) must be >= min_gram ({min_gram})"
            )));
        }
        Ok(Self { min_gram, max_gram })
    }
}

impl Tokenizer for NgramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        // (byte offset, char) pairs plus a terminal offset so slices stay on
        // char boundaries
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let n_chars = boundaries.len();
        boundaries.push(text.len());

        let mut tokens = Vec::new();
        let mut token_position = 0;

        for start in 0..n_chars {
            for gram_size in self.min_gram..=self.max_gram {
                let end = start + gram_size;
                if end > n_chars {
                    break;
                }

                let (start_offset, end_offset) = (boundaries[start], boundaries[end]);
                tokens.push(Token::with_offsets(
                    &text[start_offset..end_offset],
                    token_position,
                    start_offset,
                    end_offset,
                ));
                token_position += 1;
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "ngram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ngram_creation() {
        assert!(NgramTokenizer::new(2, 3).is_ok());
        assert!(NgramTokenizer::new(0, 2).is_err());
        assert!(NgramTokenizer::new(3, 2).is_err());
    }

    #[test]
    fn test_trigram_over_host() {
        let tokenizer = NgramTokenizer::new(3, 3).unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("paypa1").unwrap().collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["pay", "ayp", "ypa", "pa1"]);
    }

    #[test]
    fn test_multibyte_offsets() {
        let tokenizer = NgramTokenizer::new(2, 2).unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("пay").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "пa");
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 3);
        assert_eq!(tokens[1].text, "ay");
        assert_eq!(tokens[1].start_offset, 2);
    }

    #[test]
    fn test_short_text() {
        let tokenizer = NgramTokenizer::new(3, 5).unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("ab").unwrap().collect();
        assert_eq!(tokens.len(), 0);
    }
}
