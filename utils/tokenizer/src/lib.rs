//! Lexical tokenization for sparse retrieval.
//!
//! Splits text on Unicode word boundaries (UAX #29) and lowercases each word.
//! Scripts without spaces between words (Han, for instance) come out one
//! ideograph per token, which is coarse but keeps BM25 postings usable.
//! Enable the `jieba` feature for `JiebaTokenizer`, which segments Chinese
//! into dictionary words.

use unicode_segmentation::UnicodeSegmentation;

#[cfg(feature = "jieba")]
mod jieba;
#[cfg(feature = "jieba")]
pub use jieba::JiebaTokenizer;

/// Turns raw text into lexical tokens.
///
/// Implementations must be pure: the same input always produces the same
/// tokens, and no state is carried between calls. The index and the query
/// must be tokenized by the same implementation.
pub trait Tokenize: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenize for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Default tokenizer: Unicode words, optionally lowercased.
#[derive(Debug, Clone, Copy)]
pub struct WordTokenizer {
    lowercase: bool,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the original casing of every token.
    pub fn case_sensitive() -> Self {
        Self { lowercase: false }
    }
}

impl Tokenize for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| {
                if self.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                }
            })
            .collect()
    }
}

/// Tokenize with the default [`WordTokenizer`].
pub fn tokenize(text: &str) -> Vec<String> {
    WordTokenizer::default().tokenize(text)
}
