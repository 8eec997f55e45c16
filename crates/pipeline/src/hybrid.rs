//! The hybrid recommender: both engines, one ranked list.
//!
//! ## Algorithm
//! 1. Reject titles the content engine does not know (empty result)
//! 2. In parallel, fetch `2 × top_n` candidates from each engine:
//!    - content: movies similar to the anchor title
//!    - collaborative: the user's predictions, or a title-anchored lookup
//!      when no user is given
//! 3. Map collaborative movie ids to titles (unmapped ids are dropped)
//! 4. Fuse the two title lists by positional score and keep `top_n`

use crate::fusion::{FusedScore, FusionWeights, fuse};
use data_loader::UserId;
use rand::Rng;
use sources::{ContentSimilarityEngine, LatentFactorPredictor};
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Number of results returned when the caller does not say
pub const DEFAULT_TOP_N: usize = 10;

/// Each engine is asked for this many times `top_n` candidates
pub const OVERSAMPLE_FACTOR: usize = 2;

/// Parameters of one hybrid request
#[derive(Debug, Clone, PartialEq)]
pub struct HybridRequest {
    /// Anchor title; must be known to the content engine
    pub title: String,
    /// Personalize the collaborative side for this user; when absent a
    /// user is sampled from those who liked the title
    pub user_id: Option<UserId>,
    pub top_n: usize,
    pub weights: FusionWeights,
}

impl HybridRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            user_id: None,
            top_n: DEFAULT_TOP_N,
            weights: FusionWeights::default(),
        }
    }

    pub fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_weights(mut self, weights: FusionWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Blends the content and collaborative engines by rank fusion
#[derive(Clone)]
pub struct HybridRecommender {
    content: ContentSimilarityEngine,
    collaborative: LatentFactorPredictor,
}

impl HybridRecommender {
    pub fn new(content: ContentSimilarityEngine, collaborative: LatentFactorPredictor) -> Self {
        Self {
            content,
            collaborative,
        }
    }

    pub fn content(&self) -> &ContentSimilarityEngine {
        &self.content
    }

    pub fn collaborative(&self) -> &LatentFactorPredictor {
        &self.collaborative
    }

    /// Fused recommendations for a request, best first.
    ///
    /// Returns an empty list when the anchor title is unknown to the content
    /// engine; there is no collaborative-only fallback. The RNG is only
    /// used by the title-anchored collaborative lookup.
    #[instrument(
        skip(self, request, rng),
        fields(title = %request.title, user_id = ?request.user_id, top_n = request.top_n)
    )]
    pub fn recommend<R: Rng + Send>(&self, request: &HybridRequest, rng: &mut R) -> Vec<FusedScore> {
        if !self.content.knows_title(&request.title) {
            debug!("Anchor title unknown to the content engine");
            return Vec::new();
        }

        let start = Instant::now();
        let pool = request.top_n.saturating_mul(OVERSAMPLE_FACTOR);

        let (content, collaborative) = rayon::join(
            || self.content.similar_titles(&request.title, pool),
            || self.collaborative_titles(request, pool, rng),
        );
        debug!(
            "Fusing {} content and {} collaborative candidates",
            content.len(),
            collaborative.len()
        );

        let fused = fuse(&content, &collaborative, request.weights, request.top_n);
        info!("Hybrid recommendation took {:?}", start.elapsed());
        fused
    }

    /// Titles of [`Self::recommend`], in the same order
    pub fn recommend_titles<R: Rng + Send>(
        &self,
        request: &HybridRequest,
        rng: &mut R,
    ) -> Vec<String> {
        self.recommend(request, rng)
            .into_iter()
            .map(|fused| fused.title)
            .collect()
    }

    /// Collaborative ranking as display titles
    fn collaborative_titles<R: Rng + ?Sized>(
        &self,
        request: &HybridRequest,
        pool: usize,
        rng: &mut R,
    ) -> Vec<String> {
        let predictions = match request.user_id {
            Some(user_id) => self.collaborative.predict_for_user(user_id, pool),
            None => self.collaborative.predict_for_title(&request.title, pool, rng),
        };

        predictions
            .into_iter()
            .filter_map(|prediction| match self.collaborative.title_of(prediction.movie_id) {
                Some(title) => Some(title.to_string()),
                None => {
                    debug!(movie_id = prediction.movie_id, "No title for movie id, dropped");
                    None
                }
            })
            .collect()
    }
}
