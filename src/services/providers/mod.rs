//! External data provider abstractions.
//!
//! The catalog (podcast search and discovery) and the embedding service are
//! both black boxes behind traits, so the pipeline can be exercised with
//! mocks and a provider swap never touches the scoring code. Both are
//! treated as unreliable: callers tolerate errors and empty results.

use crate::{error::AppResult, models::Podcast};

pub mod embeddings;
pub mod listen_notes;

/// Default page size for catalog search requests
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Catalog fields a search can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Description,
    Author,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Description => "description",
            SearchField::Author => "author",
        }
    }
}

/// A fully-specified catalog search request
///
/// Structural equality is meaningful: the query diversifier deduplicates
/// queries by comparing whole values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    /// Fields to match against; empty means all fields
    pub only_in: Vec<SearchField>,
    pub page_size: u32,
    pub sort_by_date: bool,
    pub safe_mode: bool,
}

impl SearchQuery {
    /// A search across all fields, as used by the typeahead endpoint
    pub fn podcasts(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            only_in: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_by_date: false,
            safe_mode: false,
        }
    }

    /// A description-only search, as emitted by the query diversifier
    pub fn description_only(q: impl Into<String>) -> Self {
        Self {
            only_in: vec![SearchField::Description],
            ..Self::podcasts(q)
        }
    }
}

/// Podcast catalog provider
///
/// `similar_podcasts` is a fallback lookup surfaced through its own
/// endpoint; the candidate collector only uses the first two operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PodcastCatalog: Send + Sync {
    /// Full-text podcast search
    async fn search_podcasts(&self, query: &SearchQuery) -> AppResult<Vec<Podcast>>;

    /// Top-ranked podcasts within one catalog genre
    async fn best_in_genre(&self, genre_id: u32, count: usize) -> AppResult<Vec<Podcast>>;

    /// Podcasts the catalog itself considers similar to the given one
    async fn similar_podcasts(&self, podcast_id: &str) -> AppResult<Vec<Podcast>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Text embedding provider
///
/// Returns a fixed-dimensionality vector per input. Callers substitute a
/// zero vector on failure; see the similarity engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
