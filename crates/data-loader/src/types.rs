//! Core domain types for the serving artifacts.
//!
//! This module defines the records parsed from disk and the two read-only
//! lookup structures the recommendation engines share:
//! - [`RatingHistory`]: who rated what, plus per-movie aggregates
//! - [`MovieIdTitleMap`]: movie id to display title, in catalog order

use crate::title::title_key;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie from the rating dataset (`movies.dat`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Cleaned display title: year removed, trailing article moved to front
    pub title: String,
    /// Title exactly as it appeared in the source file
    pub raw_title: String,
    /// Year extracted from the raw title (e.g., "Toy Story (1995)")
    pub year: Option<u16>,
    pub genres: Vec<String>,
}

/// A movie from the content metadata catalog (`catalog.dat`).
///
/// These rows feed the feature index. They are built by a separate
/// pipeline from [`Movie`], so ids and titles may not line up with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub director: String,
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating event from a user for a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value on the dataset's scale (0.5 - 5.0 for MovieLens)
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

/// Aggregate statistics for one movie, computed from all its ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: f32,
    pub rating_count: u32,
}

// =============================================================================
// RatingHistory
// =============================================================================

/// All rating events, indexed by user and by movie.
///
/// Built once at startup and shared read-only afterwards. The engines use it
/// for seen-set exclusion, cold-start aggregates, and anchor-user sampling.
#[derive(Debug, Default)]
pub struct RatingHistory {
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie, in insertion order
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,
    /// Distinct users, sorted ascending
    pub(crate) users: Vec<UserId>,
    pub(crate) movie_stats: HashMap<MovieId, MovieStats>,
}

impl RatingHistory {
    /// Creates a new, empty RatingHistory
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the user has at least one rating event
    pub fn has_history(&self, user_id: UserId) -> bool {
        !self.get_user_ratings(user_id).is_empty()
    }

    /// Movies the user has already rated
    pub fn seen_movies(&self, user_id: UserId) -> HashSet<MovieId> {
        self.get_user_ratings(user_id)
            .iter()
            .map(|r| r.movie_id)
            .collect()
    }

    /// All users with at least one rating, sorted ascending
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Get precomputed statistics for a movie
    pub fn get_movie_stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.movie_stats.get(&movie_id)
    }

    /// Iterate over every (movie, stats) pair. Order is unspecified.
    pub fn movie_stats(&self) -> impl Iterator<Item = (MovieId, &MovieStats)> {
        self.movie_stats.iter().map(|(&id, stats)| (id, stats))
    }

    /// Insert a rating and update the user and movie indices
    ///
    /// Aggregates are not refreshed here; call `compute_movie_stats`
    /// once all ratings are in.
    pub fn insert_rating(&mut self, rating: Rating) {
        let user_ratings = self.user_ratings.entry(rating.user_id).or_default();
        if user_ratings.is_empty()
            && let Err(pos) = self.users.binary_search(&rating.user_id)
        {
            self.users.insert(pos, rating.user_id);
        }
        user_ratings.push(rating);

        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
    }

    /// Get counts for debugging/validation: (users, rated movies, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.users.len(), self.movie_ratings.len(), total_ratings)
    }
}

// =============================================================================
// MovieIdTitleMap
// =============================================================================

/// Mapping from movie id to display title, preserving catalog order.
///
/// Catalog order is the order movies were inserted (file order when loaded
/// from disk); the collaborative engine relies on it for candidate capping
/// and tie-breaking.
#[derive(Debug, Default)]
pub struct MovieIdTitleMap {
    movies: Vec<Movie>,
    by_id: HashMap<MovieId, usize>,
    /// Normalized title key to the first catalog position carrying it
    by_title: HashMap<String, usize>,
}

impl MovieIdTitleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a movie at the end of the catalog.
    ///
    /// Returns `false` (and leaves the map untouched) if the id is already
    /// present: the first occurrence wins.
    pub fn insert_movie(&mut self, movie: Movie) -> bool {
        if self.by_id.contains_key(&movie.id) {
            return false;
        }
        let pos = self.movies.len();
        self.by_id.insert(movie.id, pos);
        self.by_title.entry(title_key(&movie.title)).or_insert(pos);
        self.movies.push(movie);
        true
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.by_id.get(&id).map(|&pos| &self.movies[pos])
    }

    /// Display title for a movie id
    pub fn title(&self, id: MovieId) -> Option<&str> {
        self.get_movie(id).map(|m| m.title.as_str())
    }

    /// Resolve a title (case- and whitespace-insensitive) to the first
    /// catalog movie carrying it
    pub fn find_by_title(&self, title: &str) -> Option<&Movie> {
        self.by_title
            .get(&title_key(title))
            .map(|&pos| &self.movies[pos])
    }

    /// Movie ids in catalog order
    pub fn movie_ids(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movies.iter().map(|m| m.id)
    }

    /// Movies in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    /// Case-insensitive substring search over display titles.
    ///
    /// Exact (key) matches come first, then substring matches, each group
    /// in catalog order.
    pub fn search(&self, query: &str) -> Vec<&Movie> {
        let needle = title_key(query);
        if needle.is_empty() {
            return Vec::new();
        }
        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for movie in &self.movies {
            let key = title_key(&movie.title);
            if key == needle {
                exact.push(movie);
            } else if key.contains(&needle) {
                partial.push(movie);
            }
        }
        exact.extend(partial);
        exact
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
