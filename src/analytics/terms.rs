//! Term extraction: tokenization, stopword filtering and frequency counting
//!
//! Text is lowercased and split on every non-alphabetic character, so
//! punctuation, whitespace and digits all act as separators. A token survives
//! when it is longer than two characters and not a stopword of the bucket's
//! language. Counts accumulate across the whole input, then terms below the
//! minimum-mention threshold are dropped.

use indexmap::IndexMap;

use super::language::Language;
use super::stopwords;

/// Default minimum number of mentions for a term to be kept
pub const DEFAULT_MIN_MENTIONS: u64 = 5;

/// Minimum token length (in characters) that is still discarded
const MAX_DISCARDED_LEN: usize = 2;

/// Term to mention count, in first-seen order
pub type TermFrequencyMap = IndexMap<String, u64>;

/// Split text into lowercased alphabetic tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// Check whether a token qualifies as a term in the given language
pub fn is_term(token: &str, language: Language) -> bool {
    token.chars().count() > MAX_DISCARDED_LEN
        && token.chars().all(char::is_alphabetic)
        && !stopwords::is_stopword(language, token)
}

/// Extracts thresholded term frequencies from a bucket of texts
#[derive(Debug, Clone, Copy)]
pub struct TermExtractor {
    min_mentions: u64,
}

impl Default for TermExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MENTIONS)
    }
}

impl TermExtractor {
    /// Create an extractor with the given minimum-mention threshold
    #[must_use]
    pub fn new(min_mentions: u64) -> Self {
        Self { min_mentions }
    }

    pub fn min_mentions(&self) -> u64 {
        self.min_mentions
    }

    /// Count every surviving term without applying the threshold
    pub fn count<I, S>(&self, texts: I, language: Language) -> TermFrequencyMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = TermFrequencyMap::new();

        for text in texts {
            for token in tokenize(text.as_ref()) {
                if is_term(&token, language) {
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
        }

        counts
    }

    /// Count terms and keep only those with at least `min_mentions` mentions
    pub fn extract<I, S>(&self, texts: I, language: Language) -> TermFrequencyMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = self.count(texts, language);
        counts.retain(|_, count| *count >= self.min_mentions);
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_on_punctuation_and_digits() {
        let tokens: Vec<_> = tokenize("Vitamin-C serum, 2024's best!! SPF50").collect();
        assert_eq!(tokens, vec!["vitamin", "c", "serum", "s", "best", "spf"]);
    }

    #[test]
    fn test_tokenize_japanese() {
        let tokens: Vec<_> = tokenize("新作コスメ、美容液！2本").collect();
        assert_eq!(tokens, vec!["新作コスメ", "美容液", "本"]);
    }

    #[test]
    fn test_is_term() {
        assert!(is_term("serum", Language::English));
        assert!(!is_term("is", Language::English));
        assert!(!is_term("the", Language::English));
        assert!(!is_term("spf50", Language::English));
        assert!(is_term("美容液", Language::Japanese));
        assert!(!is_term("美容", Language::Japanese));
        assert!(!is_term("あります", Language::Japanese));
    }

    #[test]
    fn test_extract_serum_example() {
        let texts = [
            "Skincare is great",
            "skincare skincare serum",
            "serum serum serum serum serum serum",
        ];

        let terms = TermExtractor::new(5).extract(texts, Language::English);

        assert_eq!(terms.len(), 1);
        assert_eq!(terms.get("serum"), Some(&7));
        assert!(terms.get("skincare").is_none());
    }

    #[test]
    fn test_counts_span_items() {
        let texts = ["toner", "toner toner", "Toner"];
        let terms = TermExtractor::new(4).extract(texts, Language::English);
        assert_eq!(terms.get("toner"), Some(&4));
    }

    #[test]
    fn test_count_preserves_first_seen_order() {
        let counts =
            TermExtractor::default().count(["mascara lipstick", "eyeshadow mascara"], Language::English);
        let order: Vec<_> = counts.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["mascara", "lipstick", "eyeshadow"]);
    }

    #[test]
    fn test_japanese_stopwords_filtered() {
        let texts = vec!["しかし化粧水"; 6];
        let terms = TermExtractor::new(5).extract(texts, Language::Japanese);
        // Whole run of kana/kanji is one token
        assert_eq!(terms.get("しかし化粧水"), Some(&6));

        let texts = vec!["しかし 化粧水"; 6];
        let terms = TermExtractor::new(5).extract(texts, Language::Japanese);
        assert_eq!(terms.get("化粧水"), Some(&6));
        assert!(terms.get("しかし").is_none());
    }

    #[test]
    fn test_empty_input() {
        let texts: Vec<String> = Vec::new();
        assert!(TermExtractor::default().extract(texts, Language::English).is_empty());
    }
}
