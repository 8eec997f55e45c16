//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic catalog and rating set sized like a small MovieLens
//! slice, so no data files are needed.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{CatalogEntry, Movie, MovieId, MovieIdTitleMap, Rating, RatingHistory, UserId};
use factor_model::FactorModel;
use sources::{ContentSimilarityEngine, FeatureIndex, LatentFactorPredictor};
use std::sync::Arc;

const MOVIES: u32 = 4000;
const USERS: u32 = 500;

const GENRES: &[&str] = &[
    "Action", "Adventure", "Comedy", "Crime", "Drama", "Fantasy", "Horror", "Romance", "Sci-Fi",
    "Thriller",
];
const DIRECTORS: &[&str] = &[
    "Christopher Nolan", "Sofia Coppola", "Akira Kurosawa", "Agnes Varda", "Michael Mann",
    "Kathryn Bigelow", "Wong Kar-wai", "Jane Campion",
];

/// Cheap deterministic stand-in for a trained model
struct HashModel;

impl FactorModel for HashModel {
    fn estimate(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let h = user_id.wrapping_mul(2654435761) ^ movie_id.wrapping_mul(40503);
        1.0 + (h % 400) as f32 / 100.0
    }
}

fn catalog() -> Vec<CatalogEntry> {
    (1..=MOVIES)
        .map(|id| CatalogEntry {
            id,
            title: format!("Movie Number {}", id),
            year: Some(1950 + (id % 70) as u16),
            genres: vec![
                GENRES[id as usize % GENRES.len()].to_string(),
                GENRES[(id as usize / 3) % GENRES.len()].to_string(),
            ],
            director: DIRECTORS[id as usize % DIRECTORS.len()].to_string(),
        })
        .collect()
}

fn predictor() -> LatentFactorPredictor {
    let titles = MovieIdTitleMap::from_movies(catalog().into_iter().map(|entry| Movie {
        id: entry.id,
        raw_title: entry.title.clone(),
        title: entry.title,
        year: entry.year,
        genres: entry.genres,
    }));
    let ratings = (1..=USERS).flat_map(|user_id| {
        (0..40).map(move |k| Rating {
            user_id,
            movie_id: 1 + (user_id * 37 + k * 101) % MOVIES,
            rating: 1.0 + ((user_id + k) % 5) as f32,
            timestamp: 1000000,
        })
    });
    LatentFactorPredictor::new(
        Arc::new(HashModel),
        Arc::new(RatingHistory::from_ratings(ratings)),
        Arc::new(titles),
    )
}

fn bench_build_feature_index(c: &mut Criterion) {
    let entries = catalog();

    c.bench_function("build_feature_index", |b| {
        b.iter(|| {
            let index = FeatureIndex::build(black_box(entries.clone())).unwrap();
            black_box(index)
        })
    });
}

fn bench_similar_items(c: &mut Criterion) {
    let index = FeatureIndex::build(catalog()).expect("Failed to build feature index");
    let engine = ContentSimilarityEngine::new(Arc::new(index));

    c.bench_function("content_similar_items", |b| {
        b.iter(|| {
            let similar = engine.similar_items(black_box("Movie Number 42"), black_box(20));
            black_box(similar)
        })
    });
}

fn bench_predict_for_user(c: &mut Criterion) {
    let predictor = predictor();

    c.bench_function("collaborative_predict_for_user", |b| {
        b.iter(|| {
            let predictions = predictor.predict_for_user(black_box(1), black_box(20));
            black_box(predictions)
        })
    });
}

fn bench_cold_start(c: &mut Criterion) {
    let predictor = predictor();

    c.bench_function("collaborative_cold_start", |b| {
        b.iter(|| {
            let predictions = predictor.cold_start(black_box(20));
            black_box(predictions)
        })
    });
}

criterion_group!(
    benches,
    bench_build_feature_index,
    bench_similar_items,
    bench_predict_for_user,
    bench_cold_start
);
criterion_main!(benches);
