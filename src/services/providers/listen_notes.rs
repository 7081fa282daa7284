/// Listen Notes API provider
///
/// Backs all three catalog operations against the Listen Notes REST API:
///
/// 1. Search: /search?type=podcast → full-text results
/// 2. Genre listing: /best_podcasts?genre_id= → curated top podcasts
/// 3. Similar items: /podcasts/{id}/recommendations
///
/// Search results arrive with `*_original` field names while the other two
/// endpoints use plain names; both funnel through `RawPodcast` and come out
/// standardized.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Podcast, RawPodcast},
    services::providers::{PodcastCatalog, SearchQuery},
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const GENRE_CACHE_TTL: u64 = 86400; // 1 day
const SIMILAR_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct ListenNotesProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawPodcast>,
}

#[derive(Deserialize)]
struct BestPodcastsResponse {
    #[serde(default)]
    podcasts: Vec<RawPodcast>,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    recommendations: Vec<RawPodcast>,
}

impl ListenNotesProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// Issues a GET against a Listen Notes endpoint and checks the status
    async fn get(&self, path: &str, params: &[(&str, String)]) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .header("X-ListenAPI-Key", &self.api_key)
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Listen Notes API returned status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    fn standardize_all(raw: Vec<RawPodcast>) -> Vec<Podcast> {
        raw.into_iter().filter_map(RawPodcast::standardize).collect()
    }

    /// Cache key fingerprint for a search query
    fn search_fingerprint(query: &SearchQuery) -> String {
        let fields: Vec<&str> = query.only_in.iter().map(|f| f.as_str()).collect();
        format!(
            "{}|{}|{}|{}|{}",
            query.q,
            fields.join(","),
            query.page_size,
            query.sort_by_date as u8,
            query.safe_mode as u8
        )
    }
}

#[async_trait::async_trait]
impl PodcastCatalog for ListenNotesProvider {
    async fn search_podcasts(&self, query: &SearchQuery) -> AppResult<Vec<Podcast>> {
        if query.q.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let query = query.clone();
        cached!(
            self.cache,
            CacheKey::Search(Self::search_fingerprint(&query)),
            SEARCH_CACHE_TTL,
            async move {
                let mut params: Vec<(&str, String)> = vec![
                    ("q", query.q.clone()),
                    ("type", "podcast".to_string()),
                    ("page_size", query.page_size.to_string()),
                    ("sort_by_date", (query.sort_by_date as u8).to_string()),
                    ("safe_mode", (query.safe_mode as u8).to_string()),
                ];
                if !query.only_in.is_empty() {
                    let fields: Vec<&str> = query.only_in.iter().map(|f| f.as_str()).collect();
                    params.push(("only_in", fields.join(",")));
                }

                let response = self.get("/search", &params).await?;
                let parsed: SearchResponse = response.json().await?;
                let podcasts = Self::standardize_all(parsed.results);

                tracing::info!(
                    query = %query.q,
                    results = podcasts.len(),
                    provider = "listen_notes",
                    "Podcast search completed"
                );

                Ok::<Vec<Podcast>, AppError>(podcasts)
            }
        )
    }

    async fn best_in_genre(&self, genre_id: u32, count: usize) -> AppResult<Vec<Podcast>> {
        cached!(
            self.cache,
            CacheKey::GenreTop(genre_id),
            GENRE_CACHE_TTL,
            async move {
                let params: Vec<(&str, String)> = vec![
                    ("genre_id", genre_id.to_string()),
                    ("safe_mode", "0".to_string()),
                ];

                let response = self.get("/best_podcasts", &params).await?;
                let parsed: BestPodcastsResponse = response.json().await?;
                let podcasts = Self::standardize_all(parsed.podcasts);

                tracing::info!(
                    genre_id = genre_id,
                    results = podcasts.len(),
                    provider = "listen_notes",
                    "Genre listing fetched"
                );

                Ok::<Vec<Podcast>, AppError>(podcasts)
            }
        )
        .map(|podcasts: Vec<Podcast>| podcasts.into_iter().take(count).collect())
    }

    async fn similar_podcasts(&self, podcast_id: &str) -> AppResult<Vec<Podcast>> {
        if podcast_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Podcast id cannot be empty".to_string(),
            ));
        }

        let podcast_id = podcast_id.to_string();
        cached!(
            self.cache,
            CacheKey::Similar(podcast_id.clone()),
            SIMILAR_CACHE_TTL,
            async move {
                let params: Vec<(&str, String)> = vec![("safe_mode", "0".to_string())];
                let path = format!("/podcasts/{}/recommendations", podcast_id);

                let response = self.get(&path, &params).await?;
                let parsed: RecommendationsResponse = response.json().await?;
                let podcasts = Self::standardize_all(parsed.recommendations);

                tracing::info!(
                    podcast_id = %podcast_id,
                    results = podcasts.len(),
                    provider = "listen_notes",
                    "Similar podcasts fetched"
                );

                Ok::<Vec<Podcast>, AppError>(podcasts)
            }
        )
    }

    fn name(&self) -> &'static str {
        "listen_notes"
    }
}
