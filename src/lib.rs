/// This crate is a content-based article recommendation engine.
/// It ranks a corpus of articles by textual similarity to a reference
/// article, or by a recency/engagement heuristic when no reference is given,
/// backed by a TF-IDF vector-space model and a bounded result cache.
pub mod cache;
pub mod document;
pub mod engine;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod scoring;

/// Recommendation Engine
/// The top-level struct of this crate. It owns the live vector-space model,
/// the preprocessor's token memos and the LRU-bounded result cache, and
/// exposes the query API:
/// - `recommend`: rank a corpus against a reference article (or by recency)
/// - `initialize_model`: build/replace the model generation explicitly
/// - `clear_caches`: drop the model and every cache
///
/// The engine is constructed from an [`EngineConfig`] and shared by
/// reference; all methods take `&self` and rebuilds publish atomically.
pub use engine::RecommendationEngine;

/// Construction options for the engine: result-cache capacity and the
/// auto-init-on-first-query policy. `EngineConfig::default()` gives a
/// 100-entry cache with auto-init enabled.
pub use engine::EngineConfig;

/// A single article as supplied by the external content source: slug, title,
/// description, tags, category, body and publish/update dates. Immutable
/// input; the engine never mutates documents.
pub use document::Document;

/// Bounded key/value cache with least-recently-used eviction.
/// `get` promotes, `insert` evicts the LRU entry once capacity is reached.
pub use cache::LruCache;

/// Memoizing tokenizer: lower-cases, strips non-word characters, splits on
/// whitespace and removes English stop words. Whole documents are memoized
/// by slug, ad hoc text by a 50-character prefix key.
pub use preprocess::Preprocessor;

/// One generation of the vector-space model plus its builder.
/// Every vector of a generation shares one term-index space; rebuilding
/// produces a new generation and invalidates everything derived from the old
/// one.
pub use model::{DocumentVector, Model, ModelBuilder};

/// Term Frequency structure
/// Per-document term occurrence counts, the base data for the TF side of the
/// TF-IDF weights.
pub use model::TermFrequency;

/// TF-IDF Weighting Trait
/// Defines the tf and idf formulas the model builder applies. Implement it to
/// plug a different weighting strategy into `ModelBuilder`; the provided
/// `DefaultWeighting` performs textbook-style weighting.
pub use model::{DefaultWeighting, TfIdfWeighting};

/// Scoring primitives: guarded cosine similarity and the linear recency
/// decay used to blend freshness into the ranking.
pub use scoring::{cosine_similarity, recency_score};

/// Error kind enum and the crate-wide `Result` alias.
pub use error::{RecommendError, Result};
