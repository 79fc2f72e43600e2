//! Recommendation orchestrator.
//!
//! Owns the single live model, the preprocessor's token memos and the bounded
//! result cache. The engine is an explicitly constructed value the host
//! shares by reference to request handlers; there is no process-wide
//! singleton. Rebuilds publish the new model atomically behind a write lock,
//! so concurrent readers never observe a half-built model, and the result
//! cache is emptied under the same lock (stale results never outlive their
//! model generation).

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cache::LruCache;
use crate::document::Document;
use crate::error::{RecommendError, Result};
use crate::model::{Model, ModelBuilder};
use crate::preprocess::Preprocessor;
use crate::scoring::{cosine_similarity, home_score, rank, recency_score, reference_score};

/// Default bound on cached recommendation results.
pub const DEFAULT_RESULT_CACHE_CAPACITY: usize = 100;

/// Construction options for [`RecommendationEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of `(reference, max_count)` result entries kept before
    /// least-recently-used eviction kicks in. Must be positive.
    pub result_cache_capacity: usize,
    /// When `true`, the first `recommend` call builds the model from the
    /// corpus it was handed. When `false`, querying before
    /// [`RecommendationEngine::initialize_model`] is a
    /// [`RecommendError::NotInitialized`] failure.
    pub auto_init: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_cache_capacity: DEFAULT_RESULT_CACHE_CAPACITY,
            auto_init: true,
        }
    }
}

/// Cache key for one recommendation query: `(reference slug or None, max_count)`.
type ResultKey = (Option<Box<str>>, usize);

/// Content-based recommendation engine.
///
/// Build once, query many: [`initialize_model`](Self::initialize_model) (or
/// the first query under `auto_init`) vectorizes the corpus, after which
/// every [`recommend`](Self::recommend) call scores candidates against the
/// live model. All methods take `&self`; the three mutable stores are guarded
/// individually and rebuilds swap the model atomically.
#[derive(Debug)]
pub struct RecommendationEngine {
    auto_init: bool,
    builder: ModelBuilder,
    generation: AtomicU64,
    model: RwLock<Option<Model>>,
    preprocessor: Mutex<Preprocessor>,
    results: Mutex<LruCache<ResultKey, Vec<Document>>>,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            auto_init: config.auto_init,
            builder: ModelBuilder::new(),
            generation: AtomicU64::new(0),
            model: RwLock::new(None),
            preprocessor: Mutex::new(Preprocessor::new()),
            results: Mutex::new(LruCache::new(config.result_cache_capacity)?),
        })
    }

    /// Whether a model generation is currently live.
    pub fn is_initialized(&self) -> bool {
        self.model.read().is_some()
    }

    /// Build a fresh model generation from `documents` and publish it,
    /// replacing any previous generation. Idempotent-replacing: calling it
    /// again rebuilds from scratch, it never accumulates.
    ///
    /// Cached results belong to the replaced term-index space and are
    /// invalidated under the same lock that publishes the new model. Token
    /// memos survive; tokenization does not depend on the model generation.
    pub fn initialize_model(&self, documents: &[Document]) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let model = {
            let mut preprocessor = self.preprocessor.lock();
            self.builder.build(&mut preprocessor, documents, generation)
        };
        info!(
            documents = documents.len(),
            vocabulary = model.vocabulary_len(),
            generation,
            "built vector-space model"
        );

        let mut live = self.model.write();
        let mut results = self.results.lock();
        *live = Some(model);
        results.clear();
    }

    /// Drop the model, the result cache and the token memos. The next query
    /// rebuilds under `auto_init`, or fails with
    /// [`RecommendError::NotInitialized`] without it.
    pub fn clear_caches(&self) {
        let mut live = self.model.write();
        let mut results = self.results.lock();
        let mut preprocessor = self.preprocessor.lock();
        *live = None;
        results.clear();
        preprocessor.clear();
        debug!("cleared model and all caches");
    }

    /// Rank `documents` and return the top `max_count`.
    ///
    /// With a `reference` slug, candidates are ordered by cosine similarity
    /// to the reference vector blended with recency, and the reference
    /// document itself is excluded. Without one, the corpus is ordered by the
    /// recency/tag-bonus heuristic (an empty corpus yields an empty result).
    /// Results are cached per `(reference, max_count)` until the model is
    /// rebuilt or [`clear_caches`](Self::clear_caches) is called.
    pub fn recommend(
        &self,
        documents: &[Document],
        reference: Option<&str>,
        max_count: usize,
    ) -> Result<Vec<Document>> {
        if max_count == 0 {
            return Err(RecommendError::InvalidArgument(
                "max_count must be positive".to_string(),
            ));
        }
        if reference.is_some() && documents.is_empty() {
            return Err(RecommendError::InvalidArgument(
                "reference-mode query over an empty corpus".to_string(),
            ));
        }

        if !self.is_initialized() {
            if self.auto_init {
                self.initialize_model(documents);
            } else {
                return Err(RecommendError::NotInitialized);
            }
        }

        let key: ResultKey = (reference.map(Box::from), max_count);
        if let Some(cached) = self.results.lock().get(&key) {
            debug!(
                reference = reference.unwrap_or("home"),
                max_count, "recommendation cache hit"
            );
            return Ok(cached.clone());
        }

        let now = Utc::now();
        let recommendations = match reference {
            Some(slug) => self.rank_by_similarity(documents, slug, max_count, now)?,
            None => rank_by_recency(documents, max_count, now),
        };

        self.results.lock().insert(key, recommendations.clone());
        Ok(recommendations)
    }

    /// Reference-mode ranking: score every candidate against the reference
    /// vector in parallel, then take the stable top slice.
    fn rank_by_similarity(
        &self,
        documents: &[Document],
        reference_slug: &str,
        max_count: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Document>> {
        let guard = self.model.read();
        let model = guard.as_ref().ok_or(RecommendError::NotInitialized)?;
        let reference = model
            .vector(reference_slug)
            .ok_or_else(|| RecommendError::UnknownReference(reference_slug.to_string()))?;

        let scored: Vec<(Document, f64)> = documents
            .par_iter()
            .filter(|document| document.slug != reference_slug)
            .filter_map(|document| {
                // Candidates that were not part of the model build have no
                // vector and are skipped, not errors.
                let vector = model.vector(&document.slug)?;
                let similarity = cosine_similarity(reference.weights(), vector.weights());
                let score = reference_score(similarity, recency_score(document, now));
                Some((document.clone(), score))
            })
            .collect();

        Ok(rank(scored, max_count))
    }
}

/// Home-mode ranking: recency and tag bonus only, no vectors involved.
fn rank_by_recency(documents: &[Document], max_count: usize, now: DateTime<Utc>) -> Vec<Document> {
    let scored: Vec<(Document, f64)> = documents
        .iter()
        .map(|document| (document.clone(), home_score(document, now)))
        .collect();
    rank(scored, max_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc(slug: &str, title: &str, tags: &[&str], category: &str, days_ago: i64) -> Document {
        Document {
            slug: slug.to_string(),
            title: title.to_string(),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.to_string(),
            body: String::new(),
            publish_date: Utc::now() - Duration::days(days_ago),
            update_date: None,
        }
    }

    fn garden_corpus() -> Vec<Document> {
        vec![
            doc(
                "a",
                "Composting basics",
                &["compost", "soil", "worms"],
                "garden",
                5,
            ),
            doc(
                "b",
                "Advanced composting",
                &["compost", "soil", "worms"],
                "garden",
                5,
            ),
            doc(
                "c",
                "Buying a telescope",
                &["astronomy", "optics"],
                "stargazing",
                5,
            ),
        ]
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn zero_max_count_is_invalid() {
        let engine = engine();
        let err = engine.recommend(&garden_corpus(), None, 0).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
    }

    #[test]
    fn reference_query_over_empty_corpus_is_invalid() {
        let engine = engine();
        let err = engine.recommend(&[], Some("a"), 4).unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
    }

    #[test]
    fn home_mode_over_empty_corpus_is_empty() {
        let engine = engine();
        assert_eq!(engine.recommend(&[], None, 4).unwrap(), Vec::new());
    }

    #[test]
    fn strict_engine_requires_explicit_init() {
        let engine = RecommendationEngine::new(EngineConfig {
            auto_init: false,
            ..EngineConfig::default()
        })
        .unwrap();
        let err = engine.recommend(&garden_corpus(), None, 4).unwrap_err();
        assert_eq!(err, RecommendError::NotInitialized);

        engine.initialize_model(&garden_corpus());
        assert!(engine.recommend(&garden_corpus(), None, 4).is_ok());
    }

    #[test]
    fn auto_init_builds_on_first_query() {
        let engine = engine();
        assert!(!engine.is_initialized());
        engine.recommend(&garden_corpus(), None, 4).unwrap();
        assert!(engine.is_initialized());
    }

    #[test]
    fn unknown_reference_is_a_distinct_error() {
        let engine = engine();
        let corpus = garden_corpus();
        let err = engine.recommend(&corpus, Some("missing"), 4).unwrap_err();
        assert_eq!(err, RecommendError::UnknownReference("missing".to_string()));
    }

    #[test]
    fn similar_documents_rank_ahead_of_dissimilar_ones() {
        let engine = engine();
        let corpus = garden_corpus();
        let result = engine.recommend(&corpus, Some("a"), 2).unwrap();
        assert_eq!(result[0].slug, "b");
    }

    #[test]
    fn reference_document_is_never_recommended() {
        let engine = engine();
        let corpus = garden_corpus();
        let result = engine.recommend(&corpus, Some("a"), 10).unwrap();
        assert!(result.iter().all(|d| d.slug != "a"));
    }

    #[test]
    fn oversized_max_count_returns_all_eligible_candidates() {
        let engine = engine();
        let corpus = garden_corpus();
        let result = engine.recommend(&corpus, Some("a"), 50).unwrap();
        assert_eq!(result.len(), corpus.len() - 1);
    }

    #[test]
    fn home_mode_prefers_heavily_tagged_documents() {
        let engine = engine();
        let corpus = vec![
            doc("plain", "No tags here", &[], "misc", 3),
            doc(
                "tagged",
                "Lots of tags",
                &["t1", "t2", "t3", "t4", "t5"],
                "misc",
                3,
            ),
        ];
        let result = engine.recommend(&corpus, None, 2).unwrap();
        assert_eq!(result[0].slug, "tagged");
        assert_eq!(result[1].slug, "plain");
    }

    #[test]
    fn results_are_cached_per_reference_and_count() {
        let engine = engine();
        let corpus = garden_corpus();
        let first = engine.recommend(&corpus, Some("a"), 2).unwrap();
        // Same key with a different corpus argument: the cached sequence
        // wins, proving the lookup short-circuits scoring.
        let shuffled: Vec<Document> = corpus.iter().rev().cloned().collect();
        let second = engine.recommend(&shuffled, Some("a"), 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rebuild_invalidates_cached_results() {
        let engine = engine();
        let corpus = garden_corpus();
        let before = engine.recommend(&corpus, None, 3).unwrap();
        assert_eq!(before.len(), 3);

        let smaller = vec![corpus[2].clone()];
        engine.initialize_model(&smaller);
        let after = engine.recommend(&smaller, None, 3).unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].slug, "c");
    }

    #[test]
    fn clear_caches_forces_a_rebuild() {
        let engine = engine();
        let corpus = garden_corpus();
        engine.recommend(&corpus, None, 2).unwrap();
        assert!(engine.is_initialized());

        engine.clear_caches();
        assert!(!engine.is_initialized());
        // auto-init kicks in again on the next query
        assert!(engine.recommend(&corpus, Some("a"), 2).is_ok());
    }

    #[test]
    fn candidates_missing_from_the_model_are_skipped() {
        let engine = engine();
        let corpus = garden_corpus();
        engine.initialize_model(&corpus);

        let mut extended = corpus.clone();
        extended.push(doc("late", "Added after the build", &[], "misc", 1));
        let result = engine.recommend(&extended, Some("a"), 10).unwrap();
        assert!(result.iter().all(|d| d.slug != "late"));
    }

    #[test]
    fn identical_corpora_produce_identical_rankings() {
        let corpus = garden_corpus();
        let first = engine();
        let second = engine();
        let lhs = first.recommend(&corpus, Some("a"), 3).unwrap();
        let rhs = second.recommend(&corpus, Some("a"), 3).unwrap();
        let lhs_slugs: Vec<&str> = lhs.iter().map(|d| d.slug.as_str()).collect();
        let rhs_slugs: Vec<&str> = rhs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(lhs_slugs, rhs_slugs);
    }

    #[test]
    fn invalid_cache_capacity_fails_construction() {
        let err = RecommendationEngine::new(EngineConfig {
            result_cache_capacity: 0,
            auto_init: true,
        })
        .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidArgument(_)));
    }
}
