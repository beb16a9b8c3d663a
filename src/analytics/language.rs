//! Two-way language partitioning by first-character code point
//!
//! This is a cheap script check, not a language detector: text whose first
//! character lies above the configured code point is treated as CJK, anything
//! else as Latin. Misclassified items are accepted noise.

use serde::{Deserialize, Serialize};

/// Default code point above which text is considered CJK
pub const DEFAULT_CJK_THRESHOLD: u32 = 1000;

/// Language bucket selected by the partitioner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Latin-script text, filtered with English stopwords
    English,
    /// CJK-script text, filtered with Japanese stopwords
    Japanese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }
}

/// Classify text by its first character
///
/// Returns `None` for empty text, which carries no signal.
#[must_use]
pub fn classify(text: &str, threshold: u32) -> Option<Language> {
    let first = text.chars().next()?;
    if u32::from(first) > threshold {
        Some(Language::Japanese)
    } else {
        Some(Language::English)
    }
}

/// Items split into the two language buckets, each in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioned<T> {
    pub english: Vec<T>,
    pub japanese: Vec<T>,
}

impl<T> Default for Partitioned<T> {
    fn default() -> Self {
        Self {
            english: Vec::new(),
            japanese: Vec::new(),
        }
    }
}

impl<T> Partitioned<T> {
    /// Bucket for a language
    pub fn bucket(&self, language: Language) -> &[T] {
        match language {
            Language::English => &self.english,
            Language::Japanese => &self.japanese,
        }
    }

    /// Mutable bucket for a language
    pub fn bucket_mut(&mut self, language: Language) -> &mut Vec<T> {
        match language {
            Language::English => &mut self.english,
            Language::Japanese => &mut self.japanese,
        }
    }

    pub fn len(&self) -> usize {
        self.english.len() + self.japanese.len()
    }

    pub fn is_empty(&self) -> bool {
        self.english.is_empty() && self.japanese.is_empty()
    }
}

/// Partition items by classifying the text returned from `text_of`
///
/// Items whose text is missing or empty are dropped.
pub fn partition_by<T, I, F>(items: I, threshold: u32, text_of: F) -> Partitioned<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Option<&str>,
{
    let mut out = Partitioned::default();

    for item in items {
        let language = text_of(&item).and_then(|text| classify(text, threshold));
        if let Some(language) = language {
            out.bucket_mut(language).push(item);
        }
    }

    out
}

/// Partition plain strings into English and Japanese buckets
pub fn partition<I, S>(texts: I, threshold: u32) -> Partitioned<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    partition_by(texts.into_iter().map(Into::into), threshold, |s: &String| {
        Some(s.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Serum launch", 1000), Some(Language::English));
        assert_eq!(classify("美容液の新作", 1000), Some(Language::Japanese));
        assert_eq!(classify("スキンケア", 1000), Some(Language::Japanese));
        assert_eq!(classify("", 1000), None);
    }

    #[test]
    fn test_classify_threshold_boundary() {
        // U+03E8 is exactly 1000 and stays Latin-class
        assert_eq!(classify("\u{3E8}x", 1000), Some(Language::English));
        assert_eq!(classify("\u{3E9}x", 1000), Some(Language::Japanese));
    }

    #[test]
    fn test_partition_preserves_order_and_drops_empty() {
        let parts = partition(
            vec!["a serum", "化粧水", "", "b toner", "乳液"],
            DEFAULT_CJK_THRESHOLD,
        );

        assert_eq!(parts.english, vec!["a serum", "b toner"]);
        assert_eq!(parts.japanese, vec!["化粧水", "乳液"]);
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_partition_by_extracted_text() {
        let items = vec![("Glow", "summary one"), ("", "orphan summary"), ("美容", "本文")];
        let parts = partition_by(items, DEFAULT_CJK_THRESHOLD, |(title, _)| Some(*title));

        assert_eq!(parts.english, vec![("Glow", "summary one")]);
        assert_eq!(parts.japanese, vec![("美容", "本文")]);
    }

    #[test]
    fn test_leading_punctuation_is_latin() {
        // Heuristic only looks at the first character
        assert_eq!(classify("「美容」", 1000), Some(Language::Japanese));
        assert_eq!(classify("#コスメ", 1000), Some(Language::English));
    }
}
