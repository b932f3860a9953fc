//! Lowercase filter implementation.
//!
//! Hostnames are case-insensitive and attackers mix case freely, so URL
//! tokens are normalized before they reach the vocabulary.
//!
//! # Examples
//!
//! ```
//! use urlguard::analysis::token_filter::Filter;
//! use urlguard::analysis::token_filter::lowercase::LowercaseFilter;
//! use urlguard::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("PayPal", 0), Token::new("LOGIN", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "paypal");
//! assert_eq!(filtered[1].text, "login");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(
            tokens.map(|token| token.with_text(token.text.to_lowercase())),
        ))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
