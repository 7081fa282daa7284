use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{standardize_favorites, RawPodcast, Recommendation},
    routes::AppState,
    services::{candidates::collect_candidates, recommendations::generate_recommendations},
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub favorites: Vec<RawPodcast>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub favorites_considered: usize,
    pub generated_at: DateTime<Utc>,
}

/// Handler for the recommendations endpoint
///
/// Standardizes the submitted favorites, collects candidates from the
/// catalog, and runs the scoring pipeline. An empty favorites list or an
/// empty catalog yields an empty recommendations array with status 200; the
/// client renders that as an empty state.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let favorites = standardize_favorites(request.favorites);

    tracing::info!(favorites = favorites.len(), "Recommendation request");

    let candidates = collect_candidates(&favorites, Arc::clone(&state.catalog)).await;
    let recommendations =
        generate_recommendations(&favorites, &candidates, &state.engine).await;

    Ok(Json(RecommendationResponse {
        favorites_considered: favorites.len(),
        recommendations,
        generated_at: Utc::now(),
    }))
}
