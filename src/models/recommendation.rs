use serde::{Deserialize, Serialize};

use crate::models::Podcast;

/// A term and its TF-IDF weight within one document's vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub term: String,
    pub score: f64,
}

/// Similarity breakdown for one (favorite, candidate) pairing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    pub semantic_score: f64,
    pub topic_score: f64,
    pub combined_score: f64,
}

/// Per-candidate scoring record, built fresh on every ranking pass
///
/// `pair_scores` holds one entry per favorite, in favorites order.
/// `similarity_score` is the mean of `combined_score` across all pairings
/// and drives the sort order; the `best_index` pairing supplies the scores
/// shown to the user. The two deliberately differ.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub podcast: Podcast,
    pub pair_scores: Vec<PairScore>,
    pub best_index: Option<usize>,
    pub similarity_score: f64,
}

impl ScoredCandidate {
    /// The breakdown for the best-matching favorite, if any
    pub fn best_pair(&self) -> Option<&PairScore> {
        self.best_index.and_then(|i| self.pair_scores.get(i))
    }
}

/// A single recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub podcast: Podcast,
    /// Best-pair combined score, displayed as the match percentage
    pub similarity_score: f64,
    pub semantic_score: f64,
    pub topic_score: f64,
    pub reason: String,
    /// Id of the favorite this podcast most resembles
    pub most_similar_to: String,
}
