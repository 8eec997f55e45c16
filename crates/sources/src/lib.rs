//! # Sources Crate
//!
//! The two candidate sources the hybrid recommender fuses.
//!
//! ## Components
//!
//! ### Content Similarity Engine
//! Item-to-item similarity over movie metadata:
//! - "Movies that read like this one"
//! - TF-IDF over title, genres and director, compared by cosine similarity
//! - Deterministic: same index and title, same list
//!
//! ### Latent Factor Predictor
//! Personalized scores from a pre-trained factor model:
//! - "Movies this user is predicted to rate highly"
//! - Skips movies the user already rated
//! - Cold-start users get the best-rated popular movies instead
//! - Title-anchored variant samples a user who liked the title
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{ContentSimilarityEngine, FeatureIndex, LatentFactorPredictor};
//! use data_loader::{MovieIdTitleMap, RatingHistory};
//! use factor_model::SvdModel;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let index = Arc::new(FeatureIndex::load(Path::new("data/catalog.dat"))?);
//! let content = ContentSimilarityEngine::new(index);
//! let similar = content.similar_titles("Interstellar", 5);
//!
//! let predictor = LatentFactorPredictor::new(
//!     Arc::new(SvdModel::load(Path::new("data/factors.json"))?),
//!     Arc::new(RatingHistory::load(Path::new("data/ratings.dat"))?),
//!     Arc::new(MovieIdTitleMap::load(Path::new("data/movies.dat"))?),
//! );
//! let for_user = predictor.predict_for_user(1, 10);
//! ```
//!
//! ## Performance
//!
//! Both sources score the whole catalog (or the first `max_candidates`
//! entries of it) per request, in parallel with rayon. Nothing is cached
//! between requests.

pub mod collaborative;
pub mod content;
pub mod feature_index;
pub mod tfidf;
pub mod types;
pub mod vector;

pub use collaborative::{
    DEFAULT_LIKED_THRESHOLD, DEFAULT_MAX_CANDIDATES, DEFAULT_MIN_VOTES, LatentFactorPredictor,
};
pub use content::ContentSimilarityEngine;
pub use feature_index::{FeatureIndex, FeatureIndexError, MovieRecord};
pub use tfidf::{TfidfVectorizer, tokenize};
pub use types::{ScoreBasis, ScoredMovie, SimilarMovie};
pub use vector::SparseVector;
