//! Similarity and ranking-score primitives.
//!
//! Two scoring modes exist. Reference mode blends cosine similarity against a
//! reference vector with a recency decay: `similarity * (1 + recency)`. Home
//! mode needs no vector at all: `recency * (1 + tag_count / 10)`. Recency is
//! measured against a caller-supplied `now`, so scores drift across calendar
//! time by design; tests pass a fixed timestamp.

use chrono::{DateTime, Utc};

use crate::document::Document;

/// Days over which the recency score decays linearly to zero.
pub const RECENCY_WINDOW_DAYS: f64 = 365.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cosine of the angle between two weight vectors.
///
/// Exactly `0.0` when either vector has zero magnitude; division by zero is
/// guarded, never raised.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut mag_a = 0.0;
    let mut mag_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let magnitude = mag_a.sqrt() * mag_b.sqrt();
    if magnitude == 0.0 {
        0.0
    } else {
        dot / magnitude
    }
}

/// Linear decay from 1 at `now` to 0 at [`RECENCY_WINDOW_DAYS`] in the past,
/// based on the document's most recent date (update date wins over publish
/// date).
pub fn recency_score(document: &Document, now: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(document.most_recent_date());
    let days_ago = elapsed.num_seconds() as f64 / SECONDS_PER_DAY;
    (1.0 - days_ago / RECENCY_WINDOW_DAYS).max(0.0)
}

/// Reference-mode ranking score.
pub fn reference_score(similarity: f64, recency: f64) -> f64 {
    similarity * (1.0 + recency)
}

/// Home-mode ranking score: recency with a tag-count bonus, no similarity
/// computation involved.
pub fn home_score(document: &Document, now: DateTime<Utc>) -> f64 {
    recency_score(document, now) * (1.0 + document.tags.len() as f64 / 10.0)
}

/// Order `scored` by descending score and keep the first `max_count` items.
///
/// The sort is stable: equal scores keep their input order. `max_count`
/// larger than the candidate set returns everything.
pub fn rank<T>(mut scored: Vec<(T, f64)>, max_count: usize) -> Vec<T> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(max_count);
    scored.into_iter().map(|(item, _)| item).collect()
}
