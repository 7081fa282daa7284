//! Query diversification.
//!
//! Derives a small set of distinct catalog searches from a favorites set,
//! so candidate collection sees thematic variety without hammering the
//! catalog API.

use std::collections::{HashMap, HashSet};

use crate::models::Podcast;
use crate::services::providers::SearchQuery;
use crate::services::text_features::{extract_keywords, extract_topics};

/// Upper bound on emitted queries
pub const MAX_QUERIES: usize = 3;

/// Topics sampled from each favorite's description
const TOPICS_PER_FAVORITE: usize = 10;

/// Keywords sampled from the combined description text
const COMBINED_KEYWORD_COUNT: usize = 10;

/// Cross-favorite themes kept after frequency ranking
const THEME_COUNT: usize = 3;

/// Builds up to [`MAX_QUERIES`] diverse description-only searches
///
/// Themes are terms that surface in the topics of more than one favorite;
/// the strongest theme and, when present, the runner-up each become a
/// query. A frequency keyword over the combined descriptions (excluding
/// publisher names) fills the middle slot. Structurally identical queries
/// are emitted once.
pub fn diverse_queries(favorites: &[Podcast]) -> Vec<SearchQuery> {
    let mut queries: Vec<SearchQuery> = Vec::new();

    let themes = cross_favorite_themes(favorites);
    if let Some(theme) = themes.first() {
        push_unique(&mut queries, SearchQuery::description_only(theme.clone()));
    }

    if let Some(keyword) = top_combined_keyword(favorites) {
        push_unique(&mut queries, SearchQuery::description_only(keyword));
    }

    if let Some(theme) = themes.get(1) {
        push_unique(&mut queries, SearchQuery::description_only(theme.clone()));
    }

    queries.truncate(MAX_QUERIES);
    queries
}

/// Terms appearing in the topic lists of more than one favorite, strongest
/// first (ties keep first-encounter order)
fn cross_favorite_themes(favorites: &[Podcast]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for favorite in favorites {
        let mut seen_in_favorite: HashSet<String> = HashSet::new();
        for topic in extract_topics(&favorite.description, TOPICS_PER_FAVORITE) {
            if seen_in_favorite.insert(topic.term.clone()) {
                if !counts.contains_key(&topic.term) {
                    order.push(topic.term.clone());
                }
                *counts.entry(topic.term).or_insert(0) += 1;
            }
        }
    }

    let mut themes: Vec<(usize, String)> = order
        .into_iter()
        .enumerate()
        .filter(|(_, term)| counts[term] > 1)
        .collect();

    themes.sort_by(|a, b| counts[&b.1].cmp(&counts[&a.1]).then(a.0.cmp(&b.0)));
    themes
        .into_iter()
        .take(THEME_COUNT)
        .map(|(_, term)| term)
        .collect()
}

/// The top frequency keyword over all descriptions combined, skipping short
/// terms and publisher names
fn top_combined_keyword(favorites: &[Podcast]) -> Option<String> {
    let combined = favorites
        .iter()
        .map(|f| f.description.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let publishers: HashSet<String> = favorites
        .iter()
        .map(|f| f.publisher.to_lowercase())
        .collect();

    extract_keywords(&combined, COMBINED_KEYWORD_COUNT)
        .into_iter()
        .find(|keyword| keyword.chars().count() > 3 && !publishers.contains(keyword))
}

fn push_unique(queries: &mut Vec<SearchQuery>, query: SearchQuery) {
    if !queries.contains(&query) {
        queries.push(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::SearchField;

    fn favorite(id: &str, description: &str, publisher: &str) -> Podcast {
        Podcast {
            id: id.to_string(),
            title: format!("Favorite {}", id),
            description: description.to_string(),
            publisher: publisher.to_string(),
            genre_ids: vec![],
            thumbnail_url: String::new(),
            website_url: String::new(),
            explicit: false,
        }
    }

    #[test]
    fn test_no_favorites_yields_no_queries() {
        assert!(diverse_queries(&[]).is_empty());
    }

    #[test]
    fn test_shared_topic_becomes_lead_query() {
        let favorites = vec![
            favorite("a", "astronomy astronomy rockets orbit", "NPR"),
            favorite("b", "astronomy telescopes galaxies", "BBC"),
        ];

        let queries = diverse_queries(&favorites);
        assert!(!queries.is_empty());
        assert_eq!(queries[0].q, "astronomy");
        assert_eq!(queries[0].only_in, vec![SearchField::Description]);
    }

    #[test]
    fn test_publisher_name_excluded_from_keyword_query() {
        let favorites = vec![favorite(
            "a",
            "wondery wondery wondery history history empires",
            "Wondery",
        )];

        let queries = diverse_queries(&favorites);
        // "wondery" is the top frequency keyword but matches the publisher.
        assert!(queries.iter().all(|q| q.q != "wondery"));
        assert!(queries.iter().any(|q| q.q == "history"));
    }

    #[test]
    fn test_queries_are_distinct_and_bounded() {
        let favorites = vec![
            favorite("a", "astronomy astronomy planets stars comets", "NPR"),
            favorite("b", "astronomy planets telescopes", "BBC"),
            favorite("c", "astronomy planets meteors", "CBC"),
        ];

        let queries = diverse_queries(&favorites);
        assert!(queries.len() <= MAX_QUERIES);
        for (i, query) in queries.iter().enumerate() {
            for other in &queries[i + 1..] {
                assert_ne!(query, other);
            }
        }
    }

    #[test]
    fn test_single_favorite_has_no_themes() {
        let favorites = vec![favorite(
            "a",
            "chess openings endgames tactics strategy",
            "NPR",
        )];

        let queries = diverse_queries(&favorites);
        // No cross-favorite theme exists; only the keyword query fires.
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].q, "chess");
    }
}
