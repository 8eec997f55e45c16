//! Startup loading of the serving artifacts.
//!
//! Every artifact is loaded before the first request. Any failure is fatal
//! and reported as [`RecommendError::ModelUnavailable`] naming the file.

use crate::config::EngineConfig;
use crate::error::{RecommendError, RecommendResult};
use data_loader::{MovieIdTitleMap, RatingHistory};
use factor_model::{FactorModel, SvdModel};
use sources::FeatureIndex;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// The loaded, immutable state shared by every request
#[derive(Clone)]
pub struct Artifacts {
    pub index: Arc<FeatureIndex>,
    pub titles: Arc<MovieIdTitleMap>,
    pub history: Arc<RatingHistory>,
    pub model: Arc<dyn FactorModel>,
}

impl Artifacts {
    /// Load all four artifacts in parallel
    pub fn load(config: &EngineConfig) -> RecommendResult<Self> {
        let start = Instant::now();
        let catalog_path = config.catalog_path();
        let movies_path = config.movies_path();
        let ratings_path = config.ratings_path();
        let model_path = config.model_path();

        let ((index, titles), (history, model)) = rayon::join(
            || {
                rayon::join(
                    || FeatureIndex::load(&catalog_path),
                    || MovieIdTitleMap::load(&movies_path),
                )
            },
            || {
                rayon::join(
                    || RatingHistory::load(&ratings_path),
                    || SvdModel::load(&model_path),
                )
            },
        );

        let artifacts = Self {
            index: Arc::new(index.map_err(|e| unavailable(&catalog_path, e))?),
            titles: Arc::new(titles.map_err(|e| unavailable(&movies_path, e))?),
            history: Arc::new(history.map_err(|e| unavailable(&ratings_path, e))?),
            model: Arc::new(model.map_err(|e| unavailable(&model_path, e))?),
        };

        let (users, rated_movies, ratings) = artifacts.history.counts();
        info!(
            catalog = artifacts.index.len(),
            vocabulary = artifacts.index.dim(),
            titles = artifacts.titles.len(),
            users,
            rated_movies,
            ratings,
            "Loaded artifacts in {:?}",
            start.elapsed()
        );
        Ok(artifacts)
    }
}

fn unavailable(path: &Path, error: impl Display) -> RecommendError {
    RecommendError::ModelUnavailable {
        artifact: path.display().to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_minimal_artifacts(dir: &Path) {
        fs::write(dir.join("catalog.dat"), "1::Heat::1995::Crime::Michael Mann\n").unwrap();
        fs::write(dir.join("movies.dat"), "1::Heat (1995)::Crime\n").unwrap();
        fs::write(dir.join("ratings.dat"), "1::1::4::978300760\n").unwrap();
        fs::write(
            dir.join("factors.json"),
            r#"{ "global_mean": 3.5, "rating_scale": [1.0, 5.0] }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path());
        let config = EngineConfig::default().with_data_dir(dir.path());

        let artifacts = Artifacts::load(&config).unwrap();
        assert_eq!(artifacts.index.len(), 1);
        assert_eq!(artifacts.titles.title(1), Some("Heat"));
        assert!(artifacts.history.has_history(1));
        assert_eq!(artifacts.model.estimate(1, 1), 3.5);
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path());
        fs::remove_file(dir.path().join("factors.json")).unwrap();
        let config = EngineConfig::default().with_data_dir(dir.path());

        match Artifacts::load(&config) {
            Err(RecommendError::ModelUnavailable { artifact, .. }) => {
                assert!(artifact.ends_with("factors.json"));
            }
            other => panic!("expected ModelUnavailable, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_corrupt_artifact_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_artifacts(dir.path());
        fs::write(dir.path().join("ratings.dat"), "1::1::not-a-number::0\n").unwrap();
        let config = EngineConfig::default().with_data_dir(dir.path());

        let err = Artifacts::load(&config).err().unwrap();
        assert_eq!(err.kind(), "model_unavailable");
        assert!(err.to_string().contains("ratings.dat"));
    }
}
