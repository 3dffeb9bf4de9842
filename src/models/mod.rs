use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single rating already joined with the catalog: the title is the key
/// used everywhere downstream, the raw movie id never leaves the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingObservation {
    pub user_id: u32,
    pub title: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub movie_id: u32,
    pub title: String,
}

/// Per-title mean rating and rating count, derived straight from the
/// observation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityStat {
    pub title: String,
    pub mean_rating: f64,
    pub rating_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTitle {
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub seed_titles: Vec<String>,
    pub top_n: Option<usize>,
}

/// What the service actually produced. Sparse data is a first-class state
/// here, not an error: `InsufficientData` means no candidate had a defined
/// correlation to any seed, which callers must be able to tell apart from
/// a short-but-valid ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationResult {
    Ranked { items: Vec<ScoredTitle> },
    InsufficientData { message: String },
    PopularFallback { items: Vec<PopularityStat>, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub result: RecommendationResult,
    /// Seed titles that had no correlation data and were skipped.
    pub skipped_seeds: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl RatingObservation {
    pub fn new(user_id: u32, title: impl Into<String>, rating: f64) -> Self {
        Self {
            user_id,
            title: title.into(),
            rating,
        }
    }
}
