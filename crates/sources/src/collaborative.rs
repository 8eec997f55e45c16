//! Latent Factor Predictor - personalized collaborative filtering
//!
//! Scores unseen movies for a user with a pre-trained factor model.
//!
//! ## Algorithm
//! 1. Users with no rating history get the cold-start list: movies with at
//!    least `min_votes` ratings, by mean rating (factor model not consulted)
//! 2. Otherwise take the first `max_candidates` catalog movies, minus those
//!    the user already rated
//! 3. Estimate each candidate with the factor model, in parallel
//! 4. Stable sort by descending estimate (ties keep catalog order)
//!
//! ## Title-anchored lookups
//! When only a title is known, a representative user is sampled among the
//! users who liked that title (falling back to any user), and their
//! personalized list is returned. This stands in for a real item-neighbour
//! lookup and is random: pass a seeded RNG for repeatable output.

use crate::types::{ScoreBasis, ScoredMovie};
use data_loader::{MovieId, MovieIdTitleMap, RatingHistory, UserId};
use factor_model::FactorModel;
use rand::Rng;
use rand::seq::IndexedRandom;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Catalog entries scanned per request unless configured otherwise
pub const DEFAULT_MAX_CANDIDATES: usize = 5000;

/// Ratings a movie needs before its mean counts in the cold-start list
pub const DEFAULT_MIN_VOTES: u32 = 5;

/// Rating at or above which a user "liked" a movie
pub const DEFAULT_LIKED_THRESHOLD: f32 = 4.0;

/// Collaborative candidate source backed by a pre-trained factor model
#[derive(Clone)]
pub struct LatentFactorPredictor {
    model: Arc<dyn FactorModel>,
    history: Arc<RatingHistory>,
    titles: Arc<MovieIdTitleMap>,

    /// Upper bound on catalog entries scored per request (`None`: all)
    max_candidates: Option<usize>,

    /// Minimum vote count for the cold-start list
    min_votes: u32,

    /// Minimum rating for a user to count as liking the anchor title
    liked_threshold: f32,
}

impl LatentFactorPredictor {
    /// Create a predictor over shared, read-only artifacts
    pub fn new(
        model: Arc<dyn FactorModel>,
        history: Arc<RatingHistory>,
        titles: Arc<MovieIdTitleMap>,
    ) -> Self {
        Self {
            model,
            history,
            titles,
            max_candidates: Some(DEFAULT_MAX_CANDIDATES),
            min_votes: DEFAULT_MIN_VOTES,
            liked_threshold: DEFAULT_LIKED_THRESHOLD,
        }
    }

    /// Configure the candidate cap (default: 5000, `None` scores the whole catalog)
    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }

    /// Configure the cold-start vote threshold (default: 5)
    pub fn with_min_votes(mut self, min: u32) -> Self {
        self.min_votes = min;
        self
    }

    /// Configure the "liked" rating threshold (default: 4.0)
    pub fn with_liked_threshold(mut self, threshold: f32) -> Self {
        self.liked_threshold = threshold;
        self
    }

    pub fn titles(&self) -> &MovieIdTitleMap {
        &self.titles
    }

    pub fn history(&self) -> &RatingHistory {
        &self.history
    }

    /// Display title for a movie id, if the title map knows it
    pub fn title_of(&self, movie_id: MovieId) -> Option<&str> {
        self.titles.title(movie_id)
    }

    /// Highest-predicted unseen movies for a user, best first.
    ///
    /// A user with no history gets the cold-start list instead. A user who
    /// has rated every candidate gets an empty list.
    #[instrument(skip(self))]
    pub fn predict_for_user(&self, user_id: UserId, limit: usize) -> Vec<ScoredMovie> {
        if !self.history.has_history(user_id) {
            debug!("No rating history, using cold-start list");
            return self.cold_start(limit);
        }

        let seen = self.history.seen_movies(user_id);
        let candidates: Vec<MovieId> = self
            .titles
            .movie_ids()
            .take(self.max_candidates.unwrap_or(usize::MAX))
            .filter(|movie_id| !seen.contains(movie_id))
            .collect();
        debug!(
            "Scoring {} candidates ({} movies already rated)",
            candidates.len(),
            seen.len()
        );

        let mut predictions: Vec<ScoredMovie> = candidates
            .par_iter()
            .map(|&movie_id| ScoredMovie::predicted(movie_id, self.model.estimate(user_id, movie_id)))
            .collect();

        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        predictions.truncate(limit);
        predictions
    }

    /// Collaborative list anchored on a title rather than a user.
    ///
    /// Samples a representative user with [`Self::sample_anchor_user`] and
    /// delegates to [`Self::predict_for_user`]. With no rating data at all
    /// the cold-start list is returned.
    #[instrument(skip(self, rng))]
    pub fn predict_for_title<R: Rng + ?Sized>(
        &self,
        title: &str,
        limit: usize,
        rng: &mut R,
    ) -> Vec<ScoredMovie> {
        match self.sample_anchor_user(title, rng) {
            Some(user_id) => {
                debug!(user_id, "Sampled anchor user");
                self.predict_for_user(user_id, limit)
            }
            None => self.cold_start(limit),
        }
    }

    /// Pick a user to stand in for `title`: uniformly among users who rated
    /// it at or above the liked threshold, else uniformly among all users.
    ///
    /// Returns `None` only when there are no users at all.
    pub fn sample_anchor_user<R: Rng + ?Sized>(&self, title: &str, rng: &mut R) -> Option<UserId> {
        let likers: Vec<UserId> = match self.titles.find_by_title(title) {
            Some(movie) => self
                .history
                .get_movie_ratings(movie.id)
                .iter()
                .filter(|r| r.rating >= self.liked_threshold)
                .map(|r| r.user_id)
                .collect(),
            None => {
                warn!("Title {:?} not in the movie id map, no likers to sample", title);
                Vec::new()
            }
        };

        if let Some(&user_id) = likers.choose(rng) {
            return Some(user_id);
        }
        debug!("No users liked {:?}, sampling any user", title);
        self.history.users().choose(rng).copied()
    }

    /// Non-personalized fallback: best mean rating among movies with at
    /// least `min_votes` ratings. Ties go to the movie with more votes,
    /// then the lower id.
    ///
    /// Rated movies missing from the title map are skipped before the list
    /// is cut to `limit`.
    pub fn cold_start(&self, limit: usize) -> Vec<ScoredMovie> {
        let mut popular: Vec<ScoredMovie> = self
            .history
            .movie_stats()
            .filter(|(_, stats)| stats.rating_count >= self.min_votes)
            .filter(|&(movie_id, _)| self.titles.title(movie_id).is_some())
            .map(|(movie_id, stats)| ScoredMovie {
                movie_id,
                score: stats.avg_rating,
                basis: ScoreBasis::Popularity {
                    votes: stats.rating_count,
                },
            })
            .collect();

        popular.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| votes(b).cmp(&votes(a)))
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });
        popular.truncate(limit);
        popular
    }
}

fn votes(movie: &ScoredMovie) -> u32 {
    match movie.basis {
        ScoreBasis::Popularity { votes } => votes,
        ScoreBasis::Predicted => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, Rating};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Scores from a fixed table; counts every call
    #[derive(Default)]
    struct TableModel {
        scores: HashMap<MovieId, f32>,
        calls: AtomicUsize,
    }

    impl TableModel {
        fn with_scores(scores: &[(MovieId, f32)]) -> Self {
            Self {
                scores: scores.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FactorModel for TableModel {
        fn estimate(&self, _user_id: UserId, movie_id: MovieId) -> f32 {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            self.scores.get(&movie_id).copied().unwrap_or(3.0)
        }
    }

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            raw_title: title.to_string(),
            year: None,
            genres: vec![],
        }
    }

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 1000000,
        }
    }

    fn titles(n: MovieId) -> Arc<MovieIdTitleMap> {
        Arc::new(MovieIdTitleMap::from_movies(
            (1..=n).map(|id| movie(id, &format!("Movie {}", id))),
        ))
    }

    fn predictor(
        model: Arc<TableModel>,
        ratings: Vec<Rating>,
        catalog_size: MovieId,
    ) -> LatentFactorPredictor {
        LatentFactorPredictor::new(
            model,
            Arc::new(RatingHistory::from_ratings(ratings)),
            titles(catalog_size),
        )
    }

    #[test]
    fn test_predict_excludes_seen_and_sorts() {
        let model = Arc::new(TableModel::with_scores(&[(1, 5.0), (2, 2.0), (3, 4.5), (4, 4.0)]));
        let p = predictor(model, vec![rating(1, 1, 5.0)], 4);

        let ids: Vec<_> = p.predict_for_user(1, 10).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let model = Arc::new(TableModel::default());
        let p = predictor(model, vec![rating(1, 5, 5.0)], 5);

        let ids: Vec<_> = p.predict_for_user(1, 3).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_user_who_rated_everything_gets_nothing() {
        let model = Arc::new(TableModel::default());
        let ratings = (1..=3).map(|id| rating(1, id, 4.0)).collect();
        let p = predictor(model.clone(), ratings, 3);

        let predictions = p.predict_for_user(1, 5);
        assert!(predictions.is_empty());
        assert!(!predictions.iter().any(ScoredMovie::is_cold_start));
    }

    #[test]
    fn test_candidate_cap_applies_to_catalog_scan() {
        let model = Arc::new(TableModel::with_scores(&[(4, 5.0)]));
        let p = predictor(model.clone(), vec![rating(1, 1, 4.0)], 4).with_max_candidates(Some(2));

        // only movies 1 and 2 are scanned; 1 is seen
        let ids: Vec<_> = p.predict_for_user(1, 10).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(model.calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_cold_start_never_calls_model() {
        let model = Arc::new(TableModel::default());
        let mut ratings = Vec::new();
        // movie 1: 5 votes averaging 4.0, movie 2: 6 votes averaging 4.0,
        // movie 3: 5 votes averaging 4.6, movie 4: 2 votes averaging 5.0
        for user in 10..15 {
            ratings.push(rating(user, 1, 4.0));
            ratings.push(rating(user, 3, if user == 10 { 3.0 } else { 5.0 }));
        }
        for user in 20..26 {
            ratings.push(rating(user, 2, 4.0));
        }
        ratings.push(rating(30, 4, 5.0));
        ratings.push(rating(31, 4, 5.0));
        let p = predictor(model.clone(), ratings, 4);

        let predictions = p.predict_for_user(999, 10);
        let ids: Vec<_> = predictions.iter().map(|m| m.movie_id).collect();

        assert_eq!(ids, vec![3, 2, 1]);
        assert!(predictions.iter().all(ScoredMovie::is_cold_start));
        assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(model.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_cold_start_respects_min_votes() {
        let model = Arc::new(TableModel::default());
        let ratings = vec![rating(1, 1, 5.0), rating(2, 1, 5.0), rating(3, 2, 3.0)];
        let p = predictor(model, ratings, 2).with_min_votes(2);

        let ids: Vec<_> = p.cold_start(10).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_cold_start_skips_untitled_movies_before_limit() {
        let model = Arc::new(TableModel::default());
        let mut ratings = Vec::new();
        // movie 99 outranks movie 1 but has no title
        for user in 1..=5 {
            ratings.push(rating(user, 99, 5.0));
            ratings.push(rating(user, 1, 4.0));
        }
        let p = predictor(model, ratings, 2);

        let ids: Vec<_> = p.cold_start(1).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![1]);
        let ids: Vec<_> = p.predict_for_user(999, 1).iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_anchor_user_is_a_liker() {
        let model = Arc::new(TableModel::default());
        let ratings = vec![
            rating(1, 1, 5.0),
            rating(2, 1, 2.0),
            rating(3, 1, 4.0),
            rating(4, 2, 5.0),
        ];
        let p = predictor(model, ratings, 2);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let user = p.sample_anchor_user("movie 1", &mut rng).unwrap();
            assert!(user == 1 || user == 3);
        }
    }

    #[test]
    fn test_anchor_falls_back_to_any_user() {
        let model = Arc::new(TableModel::default());
        let ratings = vec![rating(1, 1, 2.0), rating(2, 2, 1.0)];
        let p = predictor(model, ratings, 2);

        let mut rng = StdRng::seed_from_u64(7);
        let user = p.sample_anchor_user("Movie 1", &mut rng).unwrap();
        assert!(user == 1 || user == 2);

        // unknown title behaves the same
        let user = p.sample_anchor_user("Not In Catalog", &mut rng).unwrap();
        assert!(user == 1 || user == 2);
    }

    #[test]
    fn test_title_anchored_is_repeatable_with_seed() {
        let model = Arc::new(TableModel::with_scores(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]));
        let ratings = vec![
            rating(1, 1, 5.0),
            rating(2, 1, 5.0),
            rating(2, 4, 5.0),
            rating(3, 1, 4.5),
            rating(3, 3, 4.5),
        ];
        let p = predictor(model, ratings, 4);

        let first = p.predict_for_title("Movie 1", 3, &mut StdRng::seed_from_u64(42));
        let second = p.predict_for_title("Movie 1", 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
        assert!(!first.is_empty());
        // every liker rated movie 1, so it never comes back
        assert!(first.iter().all(|m| m.movie_id != 1));
    }

    #[test]
    fn test_title_anchored_without_users() {
        let model = Arc::new(TableModel::default());
        let p = predictor(model.clone(), vec![], 3);

        let mut rng = StdRng::seed_from_u64(1);
        assert!(p.sample_anchor_user("Movie 1", &mut rng).is_none());
        assert!(p.predict_for_title("Movie 1", 5, &mut rng).is_empty());
        assert_eq!(model.calls.load(AtomicOrdering::SeqCst), 0);
    }
}
