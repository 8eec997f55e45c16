//! Pre-trained latent factor models.
//!
//! This crate provides the scoring side of collaborative filtering:
//! - The [`FactorModel`] trait: estimate a user's affinity for a movie
//! - [`SvdModel`]: a biased matrix-factorization model loaded from a JSON
//!   artifact produced by the offline training pipeline
//!
//! Training is not done here. A model is loaded once at startup and shared
//! read-only between requests.

use data_loader::{MovieId, UserId};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a factor model
#[derive(Error, Debug)]
pub enum FactorModelError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode model artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Factor dimension mismatch for {entity} {id}: expected {expected}, found {found}")]
    DimensionMismatch {
        entity: &'static str,
        id: u32,
        expected: usize,
        found: usize,
    },

    #[error("Invalid rating scale: [{min}, {max}]")]
    InvalidScale { min: f32, max: f32 },
}

/// A trained predictor of user/movie affinity.
///
/// `Send + Sync` so one model can serve many requests in parallel.
pub trait FactorModel: Send + Sync {
    /// Predicted score of `movie_id` for `user_id` on the model's rating scale
    fn estimate(&self, user_id: UserId, movie_id: MovieId) -> f32;
}

/// Learned bias and latent vector for one user or item
#[derive(Debug, Clone, Deserialize)]
pub struct LatentFactors {
    #[serde(default)]
    pub bias: f32,
    pub factors: Vec<f32>,
}

/// Biased matrix factorization (SVD-style) model.
///
/// ```text
/// estimate(u, i) = μ + b_u + b_i + q_i · p_u
/// ```
///
/// Unknown users or items contribute neither bias nor factors, so a fully
/// unknown pair falls back to the global mean. The result is clipped to
/// the rating scale.
#[derive(Debug, Clone, Deserialize)]
pub struct SvdModel {
    global_mean: f32,
    rating_scale: (f32, f32),
    #[serde(default)]
    users: HashMap<UserId, LatentFactors>,
    #[serde(default)]
    items: HashMap<MovieId, LatentFactors>,
}

impl SvdModel {
    /// Assemble a model from its learned parameters, checking that every
    /// latent vector has the same dimensionality
    pub fn new(
        global_mean: f32,
        rating_scale: (f32, f32),
        users: HashMap<UserId, LatentFactors>,
        items: HashMap<MovieId, LatentFactors>,
    ) -> Result<Self, FactorModelError> {
        let model = Self {
            global_mean,
            rating_scale,
            users,
            items,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a model artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self, FactorModelError> {
        let reader = BufReader::new(File::open(path)?);
        let model: SvdModel = serde_json::from_reader(reader)?;
        model.validate()?;
        info!(
            users = model.users.len(),
            items = model.items.len(),
            factors = model.n_factors(),
            "Loaded factor model from {:?}",
            path
        );
        Ok(model)
    }

    /// Number of latent dimensions (0 for an empty model)
    pub fn n_factors(&self) -> usize {
        self.users
            .values()
            .chain(self.items.values())
            .map(|f| f.factors.len())
            .next()
            .unwrap_or(0)
    }

    pub fn rating_scale(&self) -> (f32, f32) {
        self.rating_scale
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    fn validate(&self) -> Result<(), FactorModelError> {
        let (min, max) = self.rating_scale;
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(FactorModelError::InvalidScale { min, max });
        }

        let expected = self.n_factors();
        let entities = self
            .users
            .iter()
            .map(|(&id, f)| ("user", id, f))
            .chain(self.items.iter().map(|(&id, f)| ("item", id, f)));
        for (entity, id, latent) in entities {
            if latent.factors.len() != expected {
                return Err(FactorModelError::DimensionMismatch {
                    entity,
                    id,
                    expected,
                    found: latent.factors.len(),
                });
            }
        }
        Ok(())
    }
}

impl FactorModel for SvdModel {
    fn estimate(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let user = self.users.get(&user_id);
        let item = self.items.get(&movie_id);

        let mut estimate = self.global_mean;
        if let Some(user) = user {
            estimate += user.bias;
        }
        if let Some(item) = item {
            estimate += item.bias;
        }
        if let (Some(user), Some(item)) = (user, item) {
            estimate += dot(&user.factors, &item.factors);
        }

        let (min, max) = self.rating_scale;
        estimate.clamp(min, max)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
