//! Vector-space model over a document corpus.
//!
//! Building is batch-oriented: documents are folded into the term statistics
//! in fixed-size chunks to bound the peak working set. Chunk boundaries never
//! affect the resulting weights because every document is accumulated before
//! any vector is extracted (IDF depends on the full corpus).

use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Document;
use crate::preprocess::Preprocessor;

/// Number of documents folded into the statistics accumulator per batch.
pub const BUILD_CHUNK_SIZE: usize = 50;

/// Term occurrence counts within a single document.
///
/// Insertion-ordered so that the vocabulary a corpus produces is stable for
/// identical input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_counts: IndexMap<Box<str>, u32>,
    total_terms: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        *self.term_counts.entry(Box::from(term)).or_insert(0) += 1;
        self.total_terms += 1;
        self
    }

    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Occurrences of `term` in this document.
    pub fn count(&self, term: &str) -> u32 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// Total number of term occurrences (not unique terms).
    pub fn total(&self) -> u64 {
        self.total_terms
    }

    pub fn unique_terms(&self) -> usize {
        self.term_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_counts.iter().map(|(term, count)| (term.as_ref(), *count))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.term_counts.keys().map(AsRef::as_ref)
    }
}

/// Weighting seam for the model builder.
///
/// Implement this to plug a different weighting strategy into
/// [`ModelBuilder`]. [`DefaultWeighting`] performs textbook term-frequency
/// normalization with a smoothed inverse document frequency.
pub trait TfIdfWeighting {
    /// Term weight within one document: occurrences relative to document length.
    fn tf(count: u32, doc_total: u64) -> f64;
    /// Corpus-wide rarity weight for one term.
    fn idf(doc_count: u64, doc_freq: u64) -> f64;
}

/// Default weighting: `tf = count / doc_total`, `idf = doc_count / (doc_freq + 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWeighting;

impl TfIdfWeighting for DefaultWeighting {
    fn tf(count: u32, doc_total: u64) -> f64 {
        if doc_total == 0 {
            return 0.0;
        }
        count as f64 / doc_total as f64
    }

    fn idf(doc_count: u64, doc_freq: u64) -> f64 {
        doc_count as f64 / (doc_freq as f64 + 1.0)
    }
}

/// Dense per-document TF-IDF weights.
///
/// Index `i` is the weight of the model's vocabulary term `i`; indices are
/// only meaningful within the model generation that produced the vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVector {
    weights: Vec<f64>,
}

impl DocumentVector {
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `(term index, weight)` pairs of the non-zero entries.
    pub fn term_weights(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, weight)| *weight != 0.0)
    }
}

/// One generation of the vector-space model: every document vector plus the
/// vocabulary that defines their shared term-index space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    vocabulary: IndexMap<Box<str>, usize>,
    vectors: IndexMap<Box<str>, DocumentVector>,
    generation: u64,
}

impl Model {
    pub fn vector(&self, slug: &str) -> Option<&DocumentVector> {
        self.vectors.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.vectors.contains_key(slug)
    }

    /// Dimension index of `term` in this generation's index space.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn doc_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Vectors in document input order.
    pub fn vectors(&self) -> impl Iterator<Item = (&str, &DocumentVector)> {
        self.vectors.iter().map(|(slug, vector)| (slug.as_ref(), vector))
    }
}

/// Builds a [`Model`] from a document corpus.
///
/// Generic over the weighting scheme; `W` defaults to [`DefaultWeighting`].
#[derive(Debug, Clone)]
pub struct ModelBuilder<W = DefaultWeighting>
where
    W: TfIdfWeighting,
{
    chunk_size: usize,
    _marker: PhantomData<W>,
}

impl Default for ModelBuilder<DefaultWeighting> {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder<DefaultWeighting> {
    pub fn new() -> Self {
        Self {
            chunk_size: BUILD_CHUNK_SIZE,
            _marker: PhantomData,
        }
    }
}

impl<W> ModelBuilder<W>
where
    W: TfIdfWeighting,
{
    pub fn with_weighting() -> Self {
        Self {
            chunk_size: BUILD_CHUNK_SIZE,
            _marker: PhantomData,
        }
    }

    /// Batch size for the accumulation phase. Affects peak memory only,
    /// never the resulting weights.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Build one model generation from `documents`.
    ///
    /// Phase one folds every document's token counts into the vocabulary and
    /// per-term document frequencies; phase two extracts one dense vector per
    /// document, in input order. Documents with no terms left after stop-word
    /// removal get an all-zero vector.
    pub fn build(
        &self,
        preprocessor: &mut Preprocessor,
        documents: &[Document],
        generation: u64,
    ) -> Model {
        let mut vocabulary: IndexMap<Box<str>, usize> = IndexMap::new();
        let mut doc_freq: Vec<u64> = Vec::new();
        let mut frequencies: Vec<TermFrequency> = Vec::with_capacity(documents.len());

        for chunk in documents.chunks(self.chunk_size) {
            for document in chunk {
                let tokens = preprocessor.document_tokens(document);
                let mut freq = TermFrequency::new();
                freq.add_terms(&tokens);
                for term in freq.terms() {
                    let next_dim = vocabulary.len();
                    let dim = *vocabulary.entry(Box::from(term)).or_insert(next_dim);
                    if dim == doc_freq.len() {
                        doc_freq.push(0);
                    }
                    doc_freq[dim] += 1;
                }
                frequencies.push(freq);
            }
            debug!(accumulated = frequencies.len(), vocabulary = vocabulary.len(), "model build batch");
        }

        let doc_count = documents.len() as u64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&freq| W::idf(doc_count, freq))
            .collect();

        let dims = vocabulary.len();
        let mut vectors = IndexMap::with_capacity(documents.len());
        for (document, freq) in documents.iter().zip(&frequencies) {
            let mut weights = vec![0.0; dims];
            for (term, count) in freq.iter() {
                if let Some(&dim) = vocabulary.get(term) {
                    weights[dim] = W::tf(count, freq.total()) * idf[dim];
                }
            }
            vectors.insert(
                Box::from(document.slug.as_str()),
                DocumentVector { weights },
            );
        }

        Model {
            vocabulary,
            vectors,
            generation,
        }
    }
}
