//! Simple test harness for the recommendation orchestrator.
//!
//! Loads the artifacts from `data/` (or the directory in `MOVIE_RECS_DATA`)
//! and runs one request of each kind.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{EngineConfig, HybridQuery, RecommendationOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    info!("Starting recommendation engine test harness");

    let mut config = EngineConfig::default();
    if let Ok(data_dir) = std::env::var("MOVIE_RECS_DATA") {
        config = config.with_data_dir(data_dir);
    }

    info!("Loading artifacts from {:?}...", config.data_dir);
    let orchestrator = RecommendationOrchestrator::load(config)
        .await
        .context("Failed to load serving artifacts")?;

    let title = "Interstellar";
    let user_id = 1;

    let similar = orchestrator
        .content_recommend(title, None)
        .await
        .context("Content recommendation failed")?;
    info!("Movies similar to {}:", title);
    for (i, movie) in similar.iter().enumerate() {
        info!("{}. {} (similarity: {:.3})", i + 1, movie.title, movie.similarity);
    }

    let predicted = orchestrator
        .collaborative_recommend(user_id, None)
        .await
        .context("Collaborative recommendation failed")?;
    info!("Predicted for user {}:", user_id);
    for (i, rec) in predicted.iter().enumerate() {
        info!(
            "{}. {} [{}] - Score: {:.3}{}",
            i + 1,
            rec.title,
            rec.movie_id,
            rec.score,
            if rec.cold_start { " (popular)" } else { "" }
        );
    }

    let query = HybridQuery {
        user_id: Some(user_id),
        weight_content: Some(0.6),
        weight_collab: Some(0.4),
        ..HybridQuery::new(title)
    };
    let fused = orchestrator
        .hybrid_recommend(query)
        .await
        .context("Hybrid recommendation failed")?;
    info!("Hybrid recommendations for {} and user {}:", title, user_id);
    for (i, rec) in fused.iter().enumerate() {
        info!(
            "{}. {} - Score: {:.2} (content {}, collaborative {})",
            i + 1,
            rec.title,
            rec.score,
            rec.content_score,
            rec.collaborative_score
        );
    }

    Ok(())
}
