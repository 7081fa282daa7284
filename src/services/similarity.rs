//! Similarity engine: weighted text construction, embedding lookups with a
//! bounded in-process cache, and the two similarity measures the ranker
//! combines.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Podcast, Topic};
use crate::services::providers::EmbeddingProvider;

/// Field weights for embedding input. Tunable; the repeat counts in
/// [`weighted_text`] derive from these rather than being spelled out.
pub const TITLE_WEIGHT: f64 = 2.0;
pub const DESCRIPTION_WEIGHT: f64 = 3.0;
pub const PUBLISHER_WEIGHT: f64 = 0.5;

/// Boost applied to the topic component of the combined score
pub const TOPIC_MATCH_WEIGHT: f64 = 1.5;

const SEMANTIC_SHARE: f64 = 0.7;
const TOPIC_SHARE: f64 = 0.3;

/// Dimensionality of the zero vector substituted on provider failure
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Embedding inputs are truncated to this many characters before sending
const MAX_EMBED_INPUT_CHARS: usize = 8000;

/// Cache entries are keyed by this many leading characters of the input
const CACHE_KEY_CHARS: usize = 100;

/// Default capacity for the per-engine embedding cache
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Blends semantic and topic similarity into the combined score
///
/// The topic term carries a deliberate boost (`TOPIC_MATCH_WEIGHT`), so the
/// result can exceed 1.0 when topic overlap is high. Known range quirk; do
/// not clamp here. Clamp at the presentation boundary if a bounded value is
/// ever required.
pub fn combine_scores(semantic: f64, topic: f64) -> f64 {
    semantic * SEMANTIC_SHARE + topic * TOPIC_MATCH_WEIGHT * TOPIC_SHARE
}

/// Concatenates podcast fields with repetition proportional to their weight
///
/// Produces `title title description description description publisher` at
/// the default weights. Every field contributes at least once.
pub fn weighted_text(podcast: &Podcast) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for _ in 0..repeats(TITLE_WEIGHT) {
        parts.push(&podcast.title);
    }
    for _ in 0..repeats(DESCRIPTION_WEIGHT) {
        parts.push(&podcast.description);
    }
    for _ in 0..repeats(PUBLISHER_WEIGHT) {
        parts.push(&podcast.publisher);
    }
    parts.join(" ")
}

fn repeats(weight: f64) -> usize {
    weight.round().max(1.0) as usize
}

/// Cosine similarity between two embedding vectors
///
/// Defensive on malformed input: empty vectors, mismatched lengths,
/// non-finite components, and zero magnitudes all score 0 rather than
/// erroring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude == 0.0 {
        return 0.0;
    }
    dot / magnitude
}

/// How much of A's topic mass is matched in B
///
/// For every A term present in B the overlap accumulates
/// `min(score_a, score_b)`, normalized by the sum of A's scores. Asymmetric
/// on purpose: `topic_similarity(a, b)` measures how well B covers A's
/// topics, not the reverse.
pub fn topic_similarity(a: &[Topic], b: &[Topic]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let b_scores: HashMap<&str, f64> = b.iter().map(|t| (t.term.as_str(), t.score)).collect();

    let total: f64 = a.iter().map(|t| t.score).sum();
    if total == 0.0 {
        return 0.0;
    }

    let matched: f64 = a
        .iter()
        .filter_map(|t| b_scores.get(t.term.as_str()).map(|s| t.score.min(*s)))
        .sum();

    matched / total
}

/// Bounded FIFO memo for embedding vectors
struct EmbeddingCache {
    capacity: usize,
    entries: HashMap<String, Vec<f32>>,
    order: VecDeque<String>,
}

impl EmbeddingCache {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: String, vector: Vec<f32>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&key) {
            self.entries.insert(key, vector);
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, vector);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Converts podcast text into embeddings and scores pairs of podcasts
///
/// Owns its embedding cache: two engines never share cached vectors, so
/// tests construct a fresh engine and get deterministic behavior without
/// global resets. Cheap to clone; clones share the provider and cache.
#[derive(Clone)]
pub struct SimilarityEngine {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<RwLock<EmbeddingCache>>,
}

impl SimilarityEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_capacity: usize) -> Self {
        Self {
            provider,
            cache: Arc::new(RwLock::new(EmbeddingCache::with_capacity(cache_capacity))),
        }
    }

    /// Embeds text, caching by a prefix-derived key
    ///
    /// The input is truncated to the provider limit first. Provider failures
    /// and malformed responses are logged and swallowed: the caller gets a
    /// zero vector and recommendation quality degrades instead of the whole
    /// pipeline failing. Concurrent misses for the same key may compute
    /// redundantly; the write is idempotent.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        let truncated = truncate_chars(text, MAX_EMBED_INPUT_CHARS);
        let key: String = truncated.chars().take(CACHE_KEY_CHARS).collect();

        if let Some(hit) = self.cache.read().await.get(&key) {
            return hit;
        }

        let vector = match self.provider.embed(&truncated).await {
            Ok(vector) if !vector.is_empty() => vector,
            Ok(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    "Embedding provider returned an empty vector, substituting zeros"
                );
                vec![0.0; DEFAULT_EMBEDDING_DIM]
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Embedding request failed, substituting zeros"
                );
                vec![0.0; DEFAULT_EMBEDDING_DIM]
            }
        };

        self.cache.write().await.insert(key, vector.clone());
        vector
    }

    #[cfg(test)]
    async fn cached_entries(&self) -> usize {
        self.cache.read().await.len()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        vector: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(vector: Vec<f32>) -> Self {
            Self {
                vector,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for FixedProvider {
        async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for FailingProvider {
        async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            Err(AppError::ExternalApi("embedding service down".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn podcast() -> Podcast {
        Podcast {
            id: "p1".to_string(),
            title: "T".to_string(),
            description: "D".to_string(),
            publisher: "P".to_string(),
            genre_ids: vec![],
            thumbnail_url: String::new(),
            website_url: String::new(),
            explicit: false,
        }
    }

    #[test]
    fn test_weighted_text_layout() {
        assert_eq!(weighted_text(&podcast()), "T T D D D P");
    }

    #[test]
    fn test_combine_scores_formula() {
        let combined = combine_scores(0.8, 0.4);
        assert!((combined - (0.8 * 0.7 + 0.4 * 1.5 * 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_combine_scores_can_exceed_one() {
        assert!(combine_scores(1.0, 1.0) > 1.0);
    }

    #[test]
    fn test_cosine_identical_vector_is_one() {
        let v = vec![0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let v = vec![0.3, -0.2, 0.9];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![0.5, -1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_rejects_malformed_input() {
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
    }

    fn topics(pairs: &[(&str, f64)]) -> Vec<Topic> {
        pairs
            .iter()
            .map(|(term, score)| Topic {
                term: term.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_topic_similarity_empty_is_zero() {
        let a = topics(&[("space", 0.5)]);
        assert_eq!(topic_similarity(&a, &[]), 0.0);
        assert_eq!(topic_similarity(&[], &a), 0.0);
    }

    #[test]
    fn test_topic_similarity_full_coverage_is_one() {
        let a = topics(&[("space", 0.4), ("rockets", 0.2)]);
        let b = topics(&[("space", 0.5), ("rockets", 0.3), ("orbit", 0.1)]);
        assert!((topic_similarity(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_topic_similarity_is_asymmetric() {
        let a = topics(&[("space", 0.4)]);
        let b = topics(&[("space", 0.4), ("orbit", 0.4)]);
        let ab = topic_similarity(&a, &b);
        let ba = topic_similarity(&b, &a);
        assert!((ab - 1.0).abs() < 1e-9);
        assert!((ba - 0.5).abs() < 1e-9);
        assert!(ab != ba);
    }

    #[tokio::test]
    async fn test_embed_caches_by_prefix() {
        let provider = Arc::new(FixedProvider::new(vec![1.0, 2.0]));
        let engine = SimilarityEngine::new(provider.clone(), 8);

        let first = engine.embed("some podcast text").await;
        let second = engine.embed("some podcast text").await;

        assert_eq!(first, vec![1.0, 2.0]);
        assert_eq!(second, vec![1.0, 2.0]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embed_shared_prefix_hits_cache() {
        let provider = Arc::new(FixedProvider::new(vec![1.0]));
        let engine = SimilarityEngine::new(provider.clone(), 8);

        let prefix = "x".repeat(100);
        engine.embed(&format!("{}{}", prefix, "tail one")).await;
        engine.embed(&format!("{}{}", prefix, "different tail")).await;

        // Both inputs share the 100-char key prefix, so one provider call.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embed_failure_yields_zero_vector() {
        let engine = SimilarityEngine::new(Arc::new(FailingProvider), 8);
        let vector = engine.embed("anything").await;
        assert_eq!(vector.len(), DEFAULT_EMBEDDING_DIM);
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_cache_eviction_is_bounded() {
        let provider = Arc::new(FixedProvider::new(vec![1.0]));
        let engine = SimilarityEngine::new(provider.clone(), 2);

        engine.embed("first").await;
        engine.embed("second").await;
        engine.embed("third").await;
        assert_eq!(engine.cached_entries().await, 2);

        // "first" was evicted; embedding it again calls the provider.
        engine.embed("first").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }
}
