//! Ranking and recommendation assembly.
//!
//! Scores every candidate against every favorite, ranks by the mean
//! combined score, and dresses the top results with human-readable
//! explanations.

use crate::models::{PairScore, Podcast, Recommendation, ScoredCandidate, Topic};
use crate::services::similarity::{
    combine_scores, cosine_similarity, topic_similarity, weighted_text, SimilarityEngine,
    DEFAULT_EMBEDDING_DIM,
};
use crate::services::text_features::{extract_topics, generate_match_reason};

/// Maximum recommendations returned to the client
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Topics extracted per podcast profile
const PROFILE_TOPIC_COUNT: usize = 15;

/// Everything the scorer needs about one podcast, computed once per
/// ranking pass
struct PodcastProfile {
    podcast: Podcast,
    embedding: Vec<f32>,
    topics: Vec<Topic>,
}

/// Builds profiles for a batch of podcasts, embedding them concurrently
///
/// Output order matches input order; the ranker indexes favorites by
/// position. A joined-out task (should not happen, embedding never errors)
/// degrades to a zero-embedding profile rather than shifting indices.
async fn build_profiles(engine: &SimilarityEngine, podcasts: &[Podcast]) -> Vec<PodcastProfile> {
    let mut tasks = Vec::new();
    for podcast in podcasts {
        let engine = engine.clone();
        let podcast = podcast.clone();
        tasks.push(tokio::spawn(async move {
            let embedding = engine.embed(&weighted_text(&podcast)).await;
            let topics = extract_topics(&podcast.description, PROFILE_TOPIC_COUNT);
            PodcastProfile {
                podcast,
                embedding,
                topics,
            }
        }));
    }

    let mut profiles = Vec::with_capacity(podcasts.len());
    for (index, task) in tasks.into_iter().enumerate() {
        match task.await {
            Ok(profile) => profiles.push(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Profile task join error, using empty profile");
                profiles.push(PodcastProfile {
                    podcast: podcasts[index].clone(),
                    embedding: vec![0.0; DEFAULT_EMBEDDING_DIM],
                    topics: Vec::new(),
                });
            }
        }
    }
    profiles
}

/// Ranks candidates against favorites
///
/// Each candidate is scored against every favorite. The aggregate used for
/// ordering is the mean combined score over ALL favorites; the best single
/// pairing is kept separately for display. Sort is stable, so candidates
/// with equal aggregates keep their collection order.
pub async fn rank(
    favorites: &[Podcast],
    candidates: &[Podcast],
    engine: &SimilarityEngine,
) -> Vec<ScoredCandidate> {
    if favorites.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let favorite_profiles = build_profiles(engine, favorites).await;
    let candidate_profiles = build_profiles(engine, candidates).await;

    let mut scored: Vec<ScoredCandidate> = candidate_profiles
        .into_iter()
        .map(|candidate| {
            let mut pair_scores = Vec::with_capacity(favorite_profiles.len());
            let mut best_index: Option<usize> = None;
            let mut best_combined = f64::NEG_INFINITY;

            for (index, favorite) in favorite_profiles.iter().enumerate() {
                let semantic = cosine_similarity(&favorite.embedding, &candidate.embedding);
                let topic = topic_similarity(&favorite.topics, &candidate.topics);
                let combined = combine_scores(semantic, topic);

                if combined > best_combined {
                    best_combined = combined;
                    best_index = Some(index);
                }
                pair_scores.push(PairScore {
                    semantic_score: semantic,
                    topic_score: topic,
                    combined_score: combined,
                });
            }

            let similarity_score = pair_scores
                .iter()
                .map(|p| p.combined_score)
                .sum::<f64>()
                / pair_scores.len() as f64;

            ScoredCandidate {
                podcast: candidate.podcast,
                pair_scores,
                best_index,
                similarity_score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored
}

/// Generates the final explained recommendation list
///
/// Empty favorites or candidates produce an empty list, never an error:
/// the HTTP layer renders that as a friendly empty state. Candidates whose
/// best match cannot be resolved are skipped. At most
/// [`MAX_RECOMMENDATIONS`] entries come back, ranked best first.
pub async fn generate_recommendations(
    favorites: &[Podcast],
    candidates: &[Podcast],
    engine: &SimilarityEngine,
) -> Vec<Recommendation> {
    if favorites.is_empty() || candidates.is_empty() {
        tracing::info!(
            favorites = favorites.len(),
            candidates = candidates.len(),
            "Nothing to recommend"
        );
        return Vec::new();
    }

    let ranked = rank(favorites, candidates, engine).await;

    let recommendations: Vec<Recommendation> = ranked
        .into_iter()
        .filter_map(|candidate| {
            let best_index = candidate.best_index?;
            let best = *candidate.pair_scores.get(best_index)?;
            let favorite = favorites.get(best_index)?;

            let reason = generate_match_reason(
                &candidate.podcast,
                favorite,
                best.semantic_score,
                best.topic_score,
            );

            Some(Recommendation {
                podcast: candidate.podcast,
                similarity_score: best.combined_score,
                semantic_score: best.semantic_score,
                topic_score: best.topic_score,
                reason,
                most_similar_to: favorite.id.clone(),
            })
        })
        .take(MAX_RECOMMENDATIONS)
        .collect();

    tracing::info!(
        recommendations = recommendations.len(),
        "Recommendation generation completed"
    );

    recommendations
}
