//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields a working configuration that reads artifacts from `data/`.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for artifact loading and request handling
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory holding the serving artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Content metadata the feature index is built from
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// MovieLens-style movie list (id to title)
    #[serde(default = "default_movies_file")]
    pub movies_file: String,

    /// Historical rating events
    #[serde(default = "default_ratings_file")]
    pub ratings_file: String,

    /// Pre-trained factor model
    #[serde(default = "default_model_file")]
    pub model_file: String,

    /// Catalog entries scored per collaborative request (`null`: no cap)
    #[serde(default = "default_max_candidates")]
    pub max_candidates: Option<usize>,

    /// Ratings a movie needs to enter the cold-start list
    #[serde(default = "default_min_votes")]
    pub min_votes: u32,

    /// Rating at or above which a user counts as liking a title
    #[serde(default = "default_liked_threshold")]
    pub liked_threshold: f32,

    /// Results returned by content and collaborative requests without a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Results returned by hybrid requests without a `top_n`
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Largest `top_n` a hybrid request may ask for
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_catalog_file() -> String {
    "catalog.dat".to_string()
}

fn default_movies_file() -> String {
    "movies.dat".to_string()
}

fn default_ratings_file() -> String {
    "ratings.dat".to_string()
}

fn default_model_file() -> String {
    "factors.json".to_string()
}

fn default_max_candidates() -> Option<usize> {
    Some(sources::DEFAULT_MAX_CANDIDATES)
}

fn default_min_votes() -> u32 {
    sources::DEFAULT_MIN_VOTES
}

fn default_liked_threshold() -> f32 {
    sources::DEFAULT_LIKED_THRESHOLD
}

fn default_limit() -> usize {
    5
}

fn default_top_n() -> usize {
    pipeline::DEFAULT_TOP_N
}

fn default_max_top_n() -> usize {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_file: default_catalog_file(),
            movies_file: default_movies_file(),
            ratings_file: default_ratings_file(),
            model_file: default_model_file(),
            max_candidates: default_max_candidates(),
            min_votes: default_min_votes(),
            liked_threshold: default_liked_threshold(),
            default_limit: default_limit(),
            default_top_n: default_top_n(),
            max_top_n: default_max_top_n(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn movies_path(&self) -> PathBuf {
        self.data_dir.join(&self.movies_file)
    }

    pub fn ratings_path(&self) -> PathBuf {
        self.data_dir.join(&self.ratings_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }

    /// Reject settings no request could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.max_top_n == 0 {
            bail!("max_top_n must be at least 1");
        }
        if self.default_top_n == 0 || self.default_top_n > self.max_top_n {
            bail!(
                "default_top_n must be between 1 and max_top_n ({}), got {}",
                self.max_top_n,
                self.default_top_n
            );
        }
        if self.default_limit == 0 {
            bail!("default_limit must be at least 1");
        }
        if !self.liked_threshold.is_finite() {
            bail!("liked_threshold must be finite");
        }
        Ok(())
    }
}
