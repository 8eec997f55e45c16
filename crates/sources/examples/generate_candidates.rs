//! Example: Generate content and collaborative candidates
//!
//! Run with: cargo run --package sources --example generate_candidates
//!
//! This example shows how to:
//! 1. Load the serving artifacts from `data/`
//! 2. Rank movies similar to a title
//! 3. Predict movies for a user
//! 4. Run a title-anchored collaborative lookup with a fixed seed

use data_loader::{MovieIdTitleMap, RatingHistory};
use factor_model::SvdModel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sources::{ContentSimilarityEngine, FeatureIndex, LatentFactorPredictor};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Candidate Generation Example ===\n");

    let data_dir = Path::new("data");
    let start = Instant::now();
    let index = Arc::new(FeatureIndex::load(&data_dir.join("catalog.dat"))?);
    let titles = Arc::new(MovieIdTitleMap::load(&data_dir.join("movies.dat"))?);
    let history = Arc::new(RatingHistory::load(&data_dir.join("ratings.dat"))?);
    let model = Arc::new(SvdModel::load(&data_dir.join("factors.json"))?);
    println!("Loaded artifacts in {:?}\n", start.elapsed());

    let title = "Interstellar";
    let content = ContentSimilarityEngine::new(index);
    let start = Instant::now();
    let similar = content.similar_items(title, 5);
    println!("Movies similar to {:?} ({:?}):", title, start.elapsed());
    for (i, movie) in similar.iter().enumerate() {
        println!("  {}. {} (similarity: {:.3})", i + 1, movie.title, movie.similarity);
    }

    let predictor = LatentFactorPredictor::new(model, history, titles);
    let user_id = 1;
    let start = Instant::now();
    let predictions = predictor.predict_for_user(user_id, 5);
    println!("\nTop 5 for user {} ({:?}):", user_id, start.elapsed());
    for (i, prediction) in predictions.iter().enumerate() {
        let name = predictor.title_of(prediction.movie_id).unwrap_or("<unknown>");
        println!("  {}. {} (score: {:.3})", i + 1, name, prediction.score);
    }

    let mut rng = StdRng::seed_from_u64(42);
    let anchored = predictor.predict_for_title(title, 5, &mut rng);
    println!("\nUsers who liked {:?} may also like:", title);
    for (i, prediction) in anchored.iter().enumerate() {
        let name = predictor.title_of(prediction.movie_id).unwrap_or("<unknown>");
        let kind = if prediction.is_cold_start() { " [popular]" } else { "" };
        println!("  {}. {} (score: {:.3}){}", i + 1, name, prediction.score, kind);
    }

    Ok(())
}
