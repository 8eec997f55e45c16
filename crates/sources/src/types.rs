//! Result types produced by the candidate sources.

use data_loader::MovieId;

/// One entry of a content-similarity ranking
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMovie {
    /// Row of the movie in the feature index
    pub row: usize,
    pub movie_id: MovieId,
    pub title: String,
    /// Cosine similarity to the query movie, in [0, 1] for TF-IDF vectors
    pub similarity: f32,
}

/// Where a collaborative score came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBasis {
    /// Estimated by the factor model for this user
    Predicted,
    /// Cold-start fallback: the score is the movie's mean rating
    Popularity { votes: u32 },
}

/// One entry of a collaborative ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMovie {
    pub movie_id: MovieId,
    pub score: f32,
    pub basis: ScoreBasis,
}

impl ScoredMovie {
    pub fn predicted(movie_id: MovieId, score: f32) -> Self {
        Self {
            movie_id,
            score,
            basis: ScoreBasis::Predicted,
        }
    }

    pub fn is_cold_start(&self) -> bool {
        matches!(self.basis, ScoreBasis::Popularity { .. })
    }
}
