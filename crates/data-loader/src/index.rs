//! Building the lookup structures from parsed records.
//!
//! - `RatingHistory`: per-user and per-movie rating indices plus aggregates
//! - `MovieIdTitleMap`: catalog-ordered id/title lookup

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

impl RatingHistory {
    /// Load and index a ratings file
    pub fn load(path: &Path) -> Result<Self> {
        let ratings = parser::parse_ratings(path)?;
        let history = Self::from_ratings(ratings);
        history.validate()?;

        let (users, movies, ratings) = history.counts();
        info!(users, movies, ratings, "Loaded rating history from {:?}", path);
        Ok(history)
    }

    /// Index a batch of rating events and compute aggregates
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let mut history = Self::new();
        for rating in ratings {
            history.insert_rating(rating);
        }
        history.compute_movie_stats();
        history
    }

    /// Compute mean rating and vote count for every rated movie
    pub fn compute_movie_stats(&mut self) {
        self.movie_stats = self
            .movie_ratings
            .par_iter()
            .map(|(&movie_id, ratings)| {
                let rating_count = ratings.len() as u32;
                let avg_rating = if rating_count > 0 {
                    let total: f32 = ratings.iter().map(|r| r.rating).sum();
                    total / rating_count as f32
                } else {
                    0.0
                };
                (movie_id, MovieStats { avg_rating, rating_count })
            })
            .collect();
        debug!("Computed stats for {} movies", self.movie_stats.len());
    }

    /// Validate data integrity: every rating value must be a positive,
    /// finite number
    pub fn validate(&self) -> Result<()> {
        for ratings in self.user_ratings.values() {
            for rating in ratings {
                if !rating.rating.is_finite() || rating.rating <= 0.0 {
                    return Err(DataLoadError::InvalidValue {
                        field: "rating".to_string(),
                        value: rating.rating.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl MovieIdTitleMap {
    /// Load a movies file into a catalog-ordered map
    pub fn load(path: &Path) -> Result<Self> {
        let movies = parser::parse_movies(path)?;
        let map = Self::from_movies(movies);
        if map.is_empty() {
            return Err(DataLoadError::ValidationError(format!(
                "no movies found in {}",
                path.display()
            )));
        }
        info!(movies = map.len(), "Loaded movie titles from {:?}", path);
        Ok(map)
    }

    /// Build a map from movies in catalog order; duplicate ids keep their
    /// first occurrence
    pub fn from_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let mut map = Self::new();
        let mut duplicates = 0usize;
        for movie in movies {
            if !map.insert_movie(movie) {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            warn!("Skipped {} movies with duplicate ids", duplicates);
        }
        map
    }
}
