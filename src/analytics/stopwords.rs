//! Static stopword sets, one per language bucket

use std::collections::HashSet;
use std::sync::LazyLock;

use super::language::Language;

/// English stopwords (NLTK corpus list)
const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Japanese stopwords: pronouns, demonstratives, particles, copulas
const JAPANESE: &[&str] = &[
    "これ", "それ", "あれ", "この", "その", "あの", "ここ", "そこ", "あそこ", "こちら", "どこ",
    "だれ", "なに", "なん", "何", "私", "貴方", "貴方方", "我々", "私達", "あの人", "あのかた",
    "彼女", "彼", "です", "あります", "おります", "います", "は", "が", "の", "に", "を", "で",
    "と", "や", "へ", "から", "より", "も", "どの", "し", "それで", "しかし",
];

static ENGLISH_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH.iter().copied().collect());

static JAPANESE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| JAPANESE.iter().copied().collect());

/// Stopword set for a language bucket
pub fn for_language(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::English => &ENGLISH_SET,
        Language::Japanese => &JAPANESE_SET,
    }
}

/// Check whether a lowercased token is a stopword in the given language
pub fn is_stopword(language: Language, token: &str) -> bool {
    for_language(language).contains(token)
}
