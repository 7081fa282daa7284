use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Podcast,
    routes::AppState,
    services::providers::SearchQuery,
};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: String,
}

/// Handler for the podcast typeahead search endpoint
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Podcast>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let podcasts = state
        .catalog
        .search_podcasts(&SearchQuery::podcasts(params.q))
        .await?;
    Ok(Json(podcasts))
}
