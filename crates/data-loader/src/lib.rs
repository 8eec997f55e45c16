//! # Data Loader Crate
//!
//! Loads and indexes the artifacts the recommendation engines read at
//! serving time.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, CatalogEntry, Rating, RatingHistory, MovieIdTitleMap)
//! - **parser**: Parse `::`-separated .dat files into Rust structs
//! - **index**: Build the lookup structures and their aggregates
//! - **title**: Title cleaning and lookup-key normalization
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{MovieIdTitleMap, RatingHistory};
//! use std::path::Path;
//!
//! let history = RatingHistory::load(Path::new("data/ratings.dat"))?;
//! let titles = MovieIdTitleMap::load(Path::new("data/movies.dat"))?;
//!
//! let seen = history.seen_movies(1);
//! println!("User 1 rated {} of {} movies", seen.len(), titles.len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod title;
pub mod types;

pub use error::{DataLoadError, Result};
pub use title::{clean_title, title_key};
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Records
    CatalogEntry,
    Movie,
    MovieStats,
    Rating,
    // Lookup structures
    MovieIdTitleMap,
    RatingHistory,
};
