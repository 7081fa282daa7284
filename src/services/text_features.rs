//! Text feature extraction for podcast descriptions.
//!
//! Pure functions, no I/O. Everything downstream (topic similarity, query
//! diversification, match explanations) is built on the normalized tokens
//! produced here.

use std::collections::HashMap;

use crate::models::{Podcast, Topic};
use crate::services::similarity::combine_scores;

/// Default digest size for [`extract_meaningful_keywords`]
pub const MEANINGFUL_KEYWORD_COUNT: usize = 8;

/// Keywords extracted per favorite when aggregating across a favorites set
const KEYWORDS_PER_FAVORITE: usize = 5;

/// Keywords compared per description when explaining a match
const SHARED_KEYWORD_POOL: usize = 10;

/// Common English words carrying no topical signal
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "for", "from",
    "further", "had", "has", "have", "he", "her", "here", "him", "his", "how", "if", "in", "into",
    "is", "it", "its", "just", "like", "me", "more", "most", "much", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "one", "only", "or", "other", "our", "out", "over", "own",
    "said", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "upon", "us", "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "why", "will", "with", "would", "you", "your",
];

/// Podcast-jargon words that appear in nearly every description and would
/// otherwise dominate every topic list
const DOMAIN_STOP_WORDS: &[&str] = &[
    "podcast",
    "podcasts",
    "episode",
    "episodes",
    "show",
    "shows",
    "host",
    "hosts",
    "hosted",
    "hosting",
    "listen",
    "listening",
    "listeners",
    "interview",
    "interviews",
    "conversation",
    "conversations",
    "guest",
    "guests",
    "talk",
    "talks",
    "talking",
    "series",
    "weekly",
    "daily",
    "week",
    "every",
    "join",
    "joins",
    "audio",
    "story",
    "stories",
];

/// Minimum token length kept by [`filter_tokens`]
///
/// Three-letter words ("cat", "war", "art") still carry topical signal;
/// anything shorter is noise once stop words are removed.
const MIN_TOKEN_LEN: usize = 3;

/// Normalizes raw text for tokenization
///
/// Lowercases, strips HTML-like tags, replaces everything outside word and
/// space classes with spaces, and collapses runs of whitespace. Idempotent.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let untagged = strip_tags(&lowered);

    let cleaned: String = untagged
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes `<...>` spans, leaving unpaired angle brackets for the character
/// filter to handle
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push(' ');
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Drops stop words, domain jargon, short tokens, and bare numbers
///
/// Order is preserved; later frequency ranking relies on first-seen order
/// for tie breaks.
pub fn filter_tokens(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|token| {
            token.chars().count() >= MIN_TOKEN_LEN
                && !STOP_WORDS.contains(&token.as_str())
                && !DOMAIN_STOP_WORDS.contains(&token.as_str())
                && !token.chars().all(|c| c.is_ascii_digit())
        })
        .collect()
}

/// Extracts the top `n` TF-IDF topics from a single document
///
/// The document is scored against itself as a one-document corpus, so the
/// idf term (`ln(n_docs / doc_freq) + 1`) degenerates to 1 and scores reduce
/// to normalized term frequency. Empty or junk input yields an empty vec.
pub fn extract_topics(text: &str, n: usize) -> Vec<Topic> {
    let tokens = filter_tokens(tokenize(&preprocess(text)));
    if tokens.is_empty() {
        return Vec::new();
    }

    let total = tokens.len() as f64;
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for token in tokens {
        if !counts.contains_key(&token) {
            order.push(token.clone());
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    // Single-document corpus: every term occurs in the one document.
    let n_docs = 1.0f64;
    let doc_freq = 1.0f64;
    let idf = (n_docs / doc_freq).ln() + 1.0;

    let mut topics: Vec<Topic> = order
        .into_iter()
        .filter(|term| term.chars().count() > 2)
        .map(|term| {
            let tf = counts[&term] as f64 / total;
            Topic {
                score: tf * idf,
                term,
            }
        })
        .collect();

    topics.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    topics.truncate(n);
    topics
}

/// Extracts the top `n` keywords by raw frequency
///
/// Ties are broken by first appearance in the text. Terms come back
/// lowercase courtesy of [`preprocess`].
pub fn extract_keywords(text: &str, n: usize) -> Vec<String> {
    let tokens = filter_tokens(tokenize(&preprocess(text)));

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.into_iter().enumerate() {
        let entry = counts.entry(token).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.truncate(n);
    ranked.into_iter().map(|(term, _)| term).collect()
}

/// Builds a space-joined keyword digest across a whole favorites set
///
/// Per favorite, the description is weighted double against the title, the
/// top keywords are taken, and terms are then ranked by how many favorites'
/// keyword lists they appear in (alphabetical on ties).
pub fn extract_meaningful_keywords(favorites: &[Podcast], n: usize) -> String {
    let mut frequency: HashMap<String, usize> = HashMap::new();

    for favorite in favorites {
        let weighted = format!(
            "{} {} {}",
            favorite.title, favorite.description, favorite.description
        );
        for keyword in extract_keywords(&weighted, KEYWORDS_PER_FAVORITE) {
            *frequency.entry(keyword).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(n)
        .map(|(term, _)| term)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produces the human-readable justification attached to a recommendation
///
/// Deterministic template assembled from genre overlap, shared description
/// keywords, and score bands. Falls back to a bare percentage when the
/// matched favorite has no usable title.
pub fn generate_match_reason(
    candidate: &Podcast,
    matched_favorite: &Podcast,
    semantic_score: f64,
    topic_score: f64,
) -> String {
    let combined = combine_scores(semantic_score, topic_score);
    let percent = (combined * 100.0).round() as i64;

    let title = matched_favorite.title.trim();
    if title.is_empty() || title == crate::models::podcast::UNKNOWN_TITLE {
        return format!("Match score: {}%", percent);
    }

    let mut details: Vec<String> = Vec::new();

    if candidate
        .genre_ids
        .iter()
        .any(|genre| matched_favorite.genre_ids.contains(genre))
    {
        details.push("shares the same genre".to_string());
    }

    let candidate_keywords = extract_keywords(&candidate.description, SHARED_KEYWORD_POOL);
    let favorite_keywords = extract_keywords(&matched_favorite.description, SHARED_KEYWORD_POOL);
    let shared: Vec<String> = candidate_keywords
        .into_iter()
        .filter(|keyword| favorite_keywords.contains(keyword))
        .take(3)
        .collect();
    if !shared.is_empty() {
        details.push(format!("both cover {}", shared.join(", ")));
    }

    if topic_score > 0.4 {
        details.push("strong thematic overlap".to_string());
    } else if topic_score > 0.2 {
        details.push("some thematic overlap".to_string());
    }

    let closing = if combined > 0.85 {
        "a very strong match"
    } else if combined > 0.7 {
        "a strong match"
    } else if combined > 0.5 {
        "a moderate match"
    } else {
        "some similarities"
    };

    let mut reason = format!("Similar to \"{}\"", title);
    if !details.is_empty() {
        reason.push_str(": ");
        reason.push_str(&details.join(", "));
    }
    reason.push_str(&format!(" ({})", closing));
    reason
}
