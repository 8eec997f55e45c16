//! # Recommendation Orchestrator
//!
//! The three operations exposed to a request-routing layer:
//! 1. Content recommend: movies similar to a title
//! 2. Collaborative recommend: movies predicted for a user (cold-start
//!    fallback for users without history)
//! 3. Hybrid recommend: both signals fused under caller weights
//!
//! Requests are validated here, then the CPU-bound engine work runs on
//! tokio's blocking pool so the async runtime is never stalled.

use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use data_loader::{MovieId, UserId};
use pipeline::{FusedScore, FusionWeights, HybridRecommender, HybridRequest};
use sources::{ContentSimilarityEngine, LatentFactorPredictor, SimilarMovie};

use crate::artifacts::Artifacts;
use crate::config::EngineConfig;
use crate::error::{RecommendError, RecommendResult};

/// One entry of a collaborative recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
    /// Score is a mean rating from the cold-start list, not a prediction
    pub cold_start: bool,
}

/// Parameters of a hybrid request; unset fields take configured defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HybridQuery {
    pub title: String,
    pub user_id: Option<UserId>,
    pub top_n: Option<usize>,
    pub weight_content: Option<f32>,
    pub weight_collab: Option<f32>,
    /// Seed for the title-anchored user sampling; random when absent
    pub seed: Option<u64>,
}

impl HybridQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Coordinates the engines over one set of loaded artifacts
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    config: Arc<EngineConfig>,
    hybrid: HybridRecommender,
}

impl RecommendationOrchestrator {
    /// Build the engines over already-loaded artifacts
    pub fn new(artifacts: Artifacts, config: EngineConfig) -> Self {
        let content = ContentSimilarityEngine::new(artifacts.index);
        let collaborative =
            LatentFactorPredictor::new(artifacts.model, artifacts.history, artifacts.titles)
                .with_max_candidates(config.max_candidates)
                .with_min_votes(config.min_votes)
                .with_liked_threshold(config.liked_threshold);

        Self {
            config: Arc::new(config),
            hybrid: HybridRecommender::new(content, collaborative),
        }
    }

    /// Load the artifacts named by `config` and build the engines.
    ///
    /// Fails with [`RecommendError::ModelUnavailable`] if any artifact
    /// cannot be loaded.
    pub async fn load(config: EngineConfig) -> RecommendResult<Self> {
        let artifacts = tokio::task::spawn_blocking({
            let config = config.clone();
            move || Artifacts::load(&config)
        })
        .await
        .map_err(|e| RecommendError::Internal(format!("Artifact loading task failed: {}", e)))??;

        Ok(Self::new(artifacts, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentSimilarityEngine {
        self.hybrid.content()
    }

    pub fn collaborative(&self) -> &LatentFactorPredictor {
        self.hybrid.collaborative()
    }

    /// Movies similar to `title`, most similar first.
    ///
    /// An unknown title is reported as [`RecommendError::TitleNotFound`].
    #[instrument(skip(self))]
    pub async fn content_recommend(
        &self,
        title: &str,
        limit: Option<usize>,
    ) -> RecommendResult<Vec<SimilarMovie>> {
        let limit = self.resolve_limit(limit)?;
        if !self.content().knows_title(title) {
            return Err(RecommendError::TitleNotFound {
                title: title.to_string(),
            });
        }

        let start = Instant::now();
        let similar = run_blocking({
            let content = self.content().clone();
            let title = title.to_string();
            move || content.similar_items(&title, limit)
        })
        .await?;

        info!(
            "Content recommendation returned {} movies in {:.2?}",
            similar.len(),
            start.elapsed()
        );
        Ok(similar)
    }

    /// Movies predicted for `user_id`, best first.
    ///
    /// Users without history get the cold-start list. Predictions whose
    /// movie id has no title are skipped.
    #[instrument(skip(self))]
    pub async fn collaborative_recommend(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> RecommendResult<Vec<MovieRecommendation>> {
        let limit = self.resolve_limit(limit)?;

        let start = Instant::now();
        let predictions = run_blocking({
            let collaborative = self.collaborative().clone();
            move || collaborative.predict_for_user(user_id, limit)
        })
        .await?;

        let recommendations: Vec<MovieRecommendation> = predictions
            .into_iter()
            .filter_map(|prediction| {
                let Some(title) = self.collaborative().title_of(prediction.movie_id) else {
                    debug!(movie_id = prediction.movie_id, "No title for movie id, skipped");
                    return None;
                };
                Some(MovieRecommendation {
                    movie_id: prediction.movie_id,
                    title: title.to_string(),
                    score: prediction.score,
                    cold_start: prediction.is_cold_start(),
                })
            })
            .collect();

        info!(
            "Collaborative recommendation returned {} movies in {:.2?}",
            recommendations.len(),
            start.elapsed()
        );
        Ok(recommendations)
    }

    /// Hybrid recommendations, highest fused score first.
    ///
    /// An unknown title yields an empty list, not an error.
    #[instrument(skip(self, query), fields(title = %query.title, user_id = ?query.user_id))]
    pub async fn hybrid_recommend(&self, query: HybridQuery) -> RecommendResult<Vec<FusedScore>> {
        let request = self.build_hybrid_request(&query)?;
        let seed = query.seed;

        let start = Instant::now();
        let fused = run_blocking({
            let hybrid = self.hybrid.clone();
            move || {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                hybrid.recommend(&request, &mut rng)
            }
        })
        .await?;

        info!(
            "Hybrid recommendation returned {} movies in {:.2?}",
            fused.len(),
            start.elapsed()
        );
        Ok(fused)
    }

    fn resolve_limit(&self, limit: Option<usize>) -> RecommendResult<usize> {
        match limit.unwrap_or(self.config.default_limit) {
            0 => Err(RecommendError::InvalidRequest(
                "limit must be at least 1".to_string(),
            )),
            limit => Ok(limit),
        }
    }

    fn build_hybrid_request(&self, query: &HybridQuery) -> RecommendResult<HybridRequest> {
        let top_n = query.top_n.unwrap_or(self.config.default_top_n);
        if top_n == 0 || top_n > self.config.max_top_n {
            return Err(RecommendError::InvalidRequest(format!(
                "top_n must be between 1 and {}, got {}",
                self.config.max_top_n, top_n
            )));
        }

        let defaults = FusionWeights::default();
        let weights = FusionWeights::new(
            check_weight("weight_content", query.weight_content.unwrap_or(defaults.content))?,
            check_weight("weight_collab", query.weight_collab.unwrap_or(defaults.collaborative))?,
        );

        Ok(HybridRequest::new(query.title.clone())
            .with_user(query.user_id)
            .with_top_n(top_n)
            .with_weights(weights))
    }
}

fn check_weight(name: &str, weight: f32) -> RecommendResult<f32> {
    if (0.0..=1.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(RecommendError::InvalidRequest(format!(
            "{} must be between 0 and 1, got {}",
            name, weight
        )))
    }
}

/// Run CPU-bound engine work on the blocking pool
async fn run_blocking<T, F>(work: F) -> RecommendResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RecommendError::Internal(format!("Recommendation task failed: {}", e)))
}
