//! Rank fusion of the content and collaborative engines.
//!
//! This crate provides:
//! - Positional scoring and weighted fusion of two ranked title lists
//! - HybridRecommender for running both engines and fusing their output
//!
//! ## Architecture
//! A hybrid request is processed in stages:
//! 1. The content engine ranks movies similar to the anchor title
//! 2. The collaborative engine ranks movies for the user (or for a user
//!    sampled from those who liked the title)
//! 3. Both rankings become positional scores and are fused under the
//!    caller's weights
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FusionWeights, HybridRecommender, HybridRequest};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let recommender = HybridRecommender::new(content_engine, predictor);
//! let request = HybridRequest::new("Interstellar")
//!     .with_user(Some(1))
//!     .with_top_n(5)
//!     .with_weights(FusionWeights::new(0.6, 0.4));
//!
//! let titles = recommender.recommend_titles(&request, &mut StdRng::seed_from_u64(42));
//! ```

pub mod fusion;
pub mod hybrid;

// Re-export main types
pub use fusion::{CandidateScore, FusedScore, FusionWeights, fuse, positional_scores};
pub use hybrid::{DEFAULT_TOP_N, HybridRecommender, HybridRequest, OVERSAMPLE_FACTOR};
