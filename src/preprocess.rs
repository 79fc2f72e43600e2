//! Text normalization and tokenization with memoization.
//!
//! Raw document text is lower-cased, stripped of everything that is not a
//! word character or whitespace, split on whitespace runs, and filtered
//! against an English stop-word list. The same input always yields the same
//! token sequence.
//!
//! Results are memoized. Whole documents are keyed by slug; ad hoc text is
//! keyed by its first [`PREFIX_KEY_CHARS`] characters. The prefix key is
//! deliberately non-injective: two texts sharing a 50-character prefix share
//! a cache entry. That is approximate caching, accepted as a trade-off for
//! cheap keys on long article bodies.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::Document;

/// Number of leading characters used as the memoization key for ad hoc text.
pub const PREFIX_KEY_CHARS: usize = 50;

/// Number of leading body characters folded into a document's token stream.
/// Bounds tokenization cost on long articles.
pub const BODY_PREFIX_CHARS: usize = 1000;

/// English stop words removed during preprocessing.
/// Articles, pronouns, prepositions, conjunctions, auxiliary verbs and other
/// high-frequency function words that carry no topical signal.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    // articles
    "a", "an", "the",
    // pronouns
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    // question words
    "what", "which", "who", "whom", "whose", "why", "when", "where", "how",
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "at",
    "before", "behind", "below", "beneath", "beside", "between", "beyond", "by", "down",
    "during", "for", "from", "in", "inside", "into", "near", "of", "off", "on", "onto",
    "out", "outside", "over", "through", "throughout", "to", "toward", "under",
    "underneath", "until", "up", "upon", "with", "within", "without",
    // conjunctions
    "and", "as", "because", "but", "if", "or", "since", "so", "than", "that", "though",
    "unless", "while",
    // auxiliary and common verbs
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "would", "should", "could", "ought", "can",
    "may", "might", "must", "will", "shall",
    // determiners, adverbs
    "all", "any", "both", "each", "every", "few", "more", "most", "much", "neither",
    "no", "none", "not", "one", "other", "same", "several", "some", "such", "very",
    "too", "only", "own", "then", "there", "these", "this", "those", "just", "now",
    "here", "again", "also", "another", "even", "ever",
];

/// Shared, immutable token sequence handed out by the memo table.
pub type TokenSequence = Arc<[Box<str>]>;

/// Memoizing tokenizer for documents and ad hoc text.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    memo: IndexMap<Box<str>, TokenSequence>,
    stop_words: HashSet<&'static str>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            memo: IndexMap::new(),
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Tokenize `text`, memoized under its first [`PREFIX_KEY_CHARS`]
    /// characters. See the module docs for the collision trade-off.
    pub fn preprocess(&mut self, text: &str) -> TokenSequence {
        let key = prefix_key(text);
        if let Some(tokens) = self.memo.get(&key) {
            return Arc::clone(tokens);
        }
        let tokens = self.tokenize(text);
        self.memo.insert(key, Arc::clone(&tokens));
        tokens
    }

    /// Tokenize the ranking-relevant text of a document, memoized under its
    /// slug. Concatenates title, description, tags, category and the first
    /// [`BODY_PREFIX_CHARS`] characters of the body.
    pub fn document_tokens(&mut self, document: &Document) -> TokenSequence {
        let key: Box<str> = format!("doc:{}", document.slug).into();
        if let Some(tokens) = self.memo.get(&key) {
            return Arc::clone(tokens);
        }

        let body_prefix: String = document.body.chars().take(BODY_PREFIX_CHARS).collect();
        let tags = document.tags.join(" ");
        let joined = [
            document.title.as_str(),
            document.description.as_str(),
            tags.as_str(),
            document.category.as_str(),
            body_prefix.as_str(),
        ]
        .join(" ");

        let tokens = self.preprocess(&joined);
        self.memo.insert(key, Arc::clone(&tokens));
        tokens
    }

    /// Drop every memoized token sequence.
    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// Number of memoized entries (document and prefix keys combined).
    pub fn cached_entries(&self) -> usize {
        self.memo.len()
    }

    fn tokenize(&self, text: &str) -> TokenSequence {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
            .collect();
        cleaned
            .split_whitespace()
            .filter(|word| !self.stop_words.contains(word))
            .map(Box::from)
            .collect()
    }
}

fn prefix_key(text: &str) -> Box<str> {
    match text.char_indices().nth(PREFIX_KEY_CHARS) {
        Some((byte_offset, _)) => text[..byte_offset].into(),
        None => text.into(),
    }
}
