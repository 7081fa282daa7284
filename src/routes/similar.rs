use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::Podcast, routes::AppState};

/// Handler for the catalog similar-podcasts passthrough endpoint
pub async fn similar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Podcast>>> {
    let podcasts = state.catalog.similar_podcasts(&id).await?;
    Ok(Json(podcasts))
}
