use crate::Tokenize;
use jieba_rs::Jieba;

/// Chinese word segmentation with the bundled jieba dictionary.
///
/// HMM handles words missing from the dictionary. Tokens without any
/// alphanumeric character (spaces, punctuation) are dropped and the rest are
/// lowercased, so mixed Chinese and Latin text behaves like [`crate::WordTokenizer`]
/// on the Latin part.
pub struct JiebaTokenizer {
    jieba: Jieba,
}

impl JiebaTokenizer {
    /// Loads the default dictionary.
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Default for JiebaTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JiebaTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiebaTokenizer").finish_non_exhaustive()
    }
}

impl Tokenize for JiebaTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .map(str::to_lowercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn segments_chinese_into_words() {
        let tokenizer = JiebaTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("我来到北京清华大学。"),
            vec!["我", "来到", "北京", "清华大学"]
        );
    }

    #[test]
    fn punctuation_and_blank_input_yield_no_tokens() {
        let tokenizer = JiebaTokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("  ，。！？ ").is_empty());
    }

    #[test]
    fn latin_words_are_lowercased() {
        let tokens = JiebaTokenizer::new().tokenize("BM25 排序");
        assert!(tokens.contains(&"bm25".to_string()));
        assert!(tokens.iter().all(|t| t.trim() == t));
    }
}
