//! Corpus input records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single article as supplied by the external content source.
///
/// Documents are immutable inputs; the engine never mutates them. The `slug`
/// is the document's identity and must be unique and stable for the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique, stable identifier
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Order-irrelevant, may be empty
    #[serde(default)]
    pub tags: Vec<String>,
    /// May be empty
    #[serde(default)]
    pub category: String,
    pub body: String,
    pub publish_date: DateTime<Utc>,
    /// When present, supersedes `publish_date` for recency
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
}

impl Document {
    /// The date that counts for recency: the update date when one exists,
    /// otherwise the publish date.
    pub fn most_recent_date(&self) -> DateTime<Utc> {
        self.update_date.unwrap_or(self.publish_date)
    }
}
