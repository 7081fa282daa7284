use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use podmatch_api::{
    config::Config,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
    services::{
        providers::{embeddings::OpenAiEmbeddings, listen_notes::ListenNotesProvider},
        similarity::DEFAULT_CACHE_CAPACITY,
        SimilarityEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("podmatch_api=debug,info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let catalog = Arc::new(ListenNotesProvider::new(
        cache,
        config.listen_api_key.clone(),
        config.listen_api_url.clone(),
    ));

    let embeddings = Arc::new(OpenAiEmbeddings::new(
        config.embedding_api_key.clone(),
        config.embedding_api_url.clone(),
        config.embedding_model.clone(),
    ));
    let engine = SimilarityEngine::new(embeddings, DEFAULT_CACHE_CAPACITY);

    let state = AppState { catalog, engine };
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "podmatch API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
