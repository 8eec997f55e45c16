//! Server crate for the hybrid movie recommendation engine.
//!
//! This crate loads the serving artifacts once at startup and exposes the
//! content, collaborative and hybrid operations through the
//! [`RecommendationOrchestrator`].

pub mod artifacts;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use artifacts::Artifacts;
pub use config::EngineConfig;
pub use error::{RecommendError, RecommendResult};
pub use orchestrator::{HybridQuery, MovieRecommendation, RecommendationOrchestrator};
