//! Candidate collection.
//!
//! Gathers podcasts the user has not favorited yet, by combining genre
//! listings with diversified description searches. Every catalog call is
//! independent and individually fallible; a failed fetch only costs its own
//! results.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::Podcast;
use crate::services::providers::PodcastCatalog;
use crate::services::queries::diverse_queries;

/// Genres considered, in the order they appear across favorites
const MAX_GENRES: usize = 2;

/// Podcasts fetched per genre listing
const GENRE_FETCH_COUNT: usize = 20;

/// Collects candidate podcasts for a favorites set
///
/// Fetches the top podcasts of the first [`MAX_GENRES`] distinct favorite
/// genres plus the diversified searches, all concurrently. Results are
/// deduplicated by id and never include a favorite. An unreachable or empty
/// catalog yields an empty list, not an error; the caller renders that as
/// an empty state.
pub async fn collect_candidates(
    favorites: &[Podcast],
    catalog: Arc<dyn PodcastCatalog>,
) -> Vec<Podcast> {
    if favorites.is_empty() {
        return Vec::new();
    }

    let mut genres: Vec<u32> = Vec::new();
    for favorite in favorites {
        for genre in &favorite.genre_ids {
            if !genres.contains(genre) {
                genres.push(*genre);
            }
        }
    }
    genres.truncate(MAX_GENRES);

    let queries = diverse_queries(favorites);

    tracing::debug!(
        genres = ?genres,
        queries = queries.len(),
        provider = catalog.name(),
        "Collecting candidates"
    );

    let mut tasks = Vec::new();
    for genre in genres {
        let catalog = Arc::clone(&catalog);
        tasks.push(tokio::spawn(async move {
            catalog.best_in_genre(genre, GENRE_FETCH_COUNT).await
        }));
    }
    for query in queries {
        let catalog = Arc::clone(&catalog);
        tasks.push(tokio::spawn(
            async move { catalog.search_podcasts(&query).await },
        ));
    }

    let mut collected: Vec<Podcast> = Vec::new();
    let mut failures = 0usize;
    for task in tasks {
        match task.await {
            Ok(Ok(podcasts)) => collected.extend(podcasts),
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!(error = %e, "Candidate fetch failed, continuing without it");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, "Candidate fetch task join error");
            }
        }
    }

    let favorite_ids: HashSet<&str> = favorites.iter().map(|f| f.id.as_str()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let candidates: Vec<Podcast> = collected
        .into_iter()
        .filter(|p| !favorite_ids.contains(p.id.as_str()))
        .filter(|p| seen.insert(p.id.clone()))
        .collect();

    tracing::info!(
        candidates = candidates.len(),
        failed_fetches = failures,
        "Candidate collection completed"
    );

    candidates
}
