//! The feature index: one TF-IDF vector per catalog movie plus a
//! case-insensitive title lookup.
//!
//! Built once (from catalog metadata, or from precomputed vectors) and
//! read-only afterwards. Catalog changes mean building a new index.

use crate::tfidf::TfidfVectorizer;
use crate::vector::SparseVector;
use data_loader::{CatalogEntry, DataLoadError, MovieId, parser, title_key};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// How many times genre terms are repeated in the feature text
const GENRE_WEIGHT: usize = 3;

/// Errors that can occur while building a feature index
#[derive(Error, Debug)]
pub enum FeatureIndexError {
    #[error("Failed to load catalog: {0}")]
    Load(#[from] DataLoadError),

    #[error("Catalog has no usable movies")]
    EmptyCatalog,

    #[error("Got {vectors} vectors for {records} catalog rows")]
    LengthMismatch { records: usize, vectors: usize },

    #[error("Vector dimension mismatch at row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Term id {term} out of range for vocabulary of size {dim}")]
    TermOutOfRange { term: u32, dim: usize },
}

/// One row of the feature index
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub row: usize,
    pub id: MovieId,
    /// Canonical title, case preserved for display
    pub title: String,
    /// Lowercased, trimmed title used for lookups
    pub title_key: String,
    pub year: Option<u16>,
    pub feature_text: String,
}

/// Build the text a movie is vectorized from: the title, the genre list
/// repeated to boost its weight, then the director.
pub fn compose_feature_text(entry: &CatalogEntry) -> String {
    let genres = entry.genres.join(", ");
    let mut text = String::with_capacity(
        entry.title.len() + (genres.len() + 1) * GENRE_WEIGHT + entry.director.len() + 2,
    );
    text.push_str(&entry.title);
    text.push(' ');
    for _ in 0..GENRE_WEIGHT {
        text.push_str(&genres);
        text.push(' ');
    }
    text.push_str(&entry.director);
    text
}

/// Drop rows missing key information and rows repeating an earlier
/// (title, year) pair. Order is preserved.
pub fn prepare_catalog(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let total = entries.len();
    let mut seen: HashSet<(String, Option<u16>)> = HashSet::new();
    let prepared: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|e| !e.title.is_empty() && !e.genres.is_empty() && !e.director.is_empty())
        .filter(|e| seen.insert((e.title.clone(), e.year)))
        .collect();

    if prepared.len() < total {
        debug!(
            "Dropped {} incomplete or duplicate catalog rows",
            total - prepared.len()
        );
    }
    prepared
}

/// Per-movie feature vectors over a shared vocabulary
#[derive(Debug, Clone)]
pub struct FeatureIndex {
    records: Vec<MovieRecord>,
    vectors: Vec<SparseVector>,
    /// Title key to row; the first row carrying a key owns it
    titles: HashMap<String, usize>,
    dim: usize,
}

impl FeatureIndex {
    /// Parse a catalog file and build the index from it
    pub fn load(path: &Path) -> Result<Self, FeatureIndexError> {
        let entries = parser::parse_catalog(path)?;
        let index = Self::build(entries)?;
        info!(
            movies = index.len(),
            vocabulary = index.dim(),
            "Built feature index from {:?}",
            path
        );
        Ok(index)
    }

    /// Clean the catalog, fit TF-IDF over the feature text, and index it
    pub fn build(entries: Vec<CatalogEntry>) -> Result<Self, FeatureIndexError> {
        let entries = prepare_catalog(entries);
        if entries.is_empty() {
            return Err(FeatureIndexError::EmptyCatalog);
        }

        let texts: Vec<String> = entries.iter().map(compose_feature_text).collect();
        let (_vectorizer, vectors) = TfidfVectorizer::fit_transform(&texts);
        Self::from_parts(entries, vectors)
    }

    /// Assemble an index from rows and already-computed vectors.
    ///
    /// Rows are taken as given (no de-duplication); every vector must
    /// share one dimensionality.
    pub fn from_parts(
        entries: Vec<CatalogEntry>,
        vectors: Vec<SparseVector>,
    ) -> Result<Self, FeatureIndexError> {
        if entries.len() != vectors.len() {
            return Err(FeatureIndexError::LengthMismatch {
                records: entries.len(),
                vectors: vectors.len(),
            });
        }
        let Some(dim) = vectors.first().map(SparseVector::dim) else {
            return Err(FeatureIndexError::EmptyCatalog);
        };
        if let Some((row, vector)) = vectors.iter().enumerate().find(|(_, v)| v.dim() != dim) {
            return Err(FeatureIndexError::DimensionMismatch {
                row,
                expected: dim,
                found: vector.dim(),
            });
        }

        let mut titles = HashMap::with_capacity(entries.len());
        let records: Vec<MovieRecord> = entries
            .into_iter()
            .enumerate()
            .map(|(row, entry)| {
                let key = title_key(&entry.title);
                titles.entry(key.clone()).or_insert(row);
                MovieRecord {
                    row,
                    id: entry.id,
                    feature_text: compose_feature_text(&entry),
                    title: entry.title,
                    title_key: key,
                    year: entry.year,
                }
            })
            .collect();

        Ok(Self {
            records,
            vectors,
            titles,
            dim,
        })
    }

    /// Resolve a title (case- and whitespace-insensitive) to its row
    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.titles.get(&title_key(title)).copied()
    }

    pub fn record(&self, row: usize) -> Option<&MovieRecord> {
        self.records.get(row)
    }

    pub fn vector(&self, row: usize) -> Option<&SparseVector> {
        self.vectors.get(row)
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vocabulary size shared by every vector
    pub fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: MovieId, title: &str, year: Option<u16>, genres: &[&str], director: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.to_string(),
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            director: director.to_string(),
        }
    }

    #[test]
    fn test_compose_feature_text() {
        let e = entry(1, "Interstellar", Some(2014), &["Adventure", "Sci-Fi"], "Christopher Nolan");
        assert_eq!(
            compose_feature_text(&e),
            "Interstellar Adventure, Sci-Fi Adventure, Sci-Fi Adventure, Sci-Fi Christopher Nolan"
        );
    }

    #[test]
    fn test_prepare_catalog_drops_incomplete_and_duplicates() {
        let entries = vec![
            entry(1, "Heat", Some(1995), &["Crime"], "Michael Mann"),
            entry(2, "Heat", Some(1995), &["Crime"], "Michael Mann"),
            entry(3, "Heat", Some(1986), &["Action"], "Dick Richards"),
            entry(4, "No Director", None, &["Drama"], ""),
            entry(5, "No Genre", None, &[], "Someone"),
        ];
        let ids: Vec<_> = prepare_catalog(entries).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_build_and_lookup() {
        let index = FeatureIndex::build(vec![
            entry(1, "Interstellar", Some(2014), &["Sci-Fi"], "Christopher Nolan"),
            entry(2, "The Godfather", Some(1972), &["Crime", "Drama"], "Francis Ford Coppola"),
        ])
        .unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.dim() > 0);
        assert_eq!(index.lookup("  the GODFATHER "), Some(1));
        assert_eq!(index.lookup("interstellar"), Some(0));
        assert_eq!(index.lookup("Nonexistent Movie Title"), None);
        assert!(index.vectors().iter().all(|v| v.dim() == index.dim()));
        assert_eq!(index.record(1).unwrap().title, "The Godfather");
    }

    #[test]
    fn test_title_collision_keeps_first_row() {
        let index = FeatureIndex::build(vec![
            entry(1, "Heat", Some(1995), &["Crime"], "Michael Mann"),
            entry(2, "Heat", Some(1986), &["Action"], "Dick Richards"),
        ])
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("heat"), Some(0));
    }

    #[test]
    fn test_build_empty_catalog() {
        assert!(matches!(FeatureIndex::build(vec![]), Err(FeatureIndexError::EmptyCatalog)));
    }

    #[test]
    fn test_from_parts_checks_dimensions() {
        let entries = vec![
            entry(1, "A", None, &["x"], "d"),
            entry(2, "B", None, &["x"], "d"),
        ];
        let vectors = vec![SparseVector::zeros(3), SparseVector::zeros(4)];
        assert!(matches!(
            FeatureIndex::from_parts(entries.clone(), vectors),
            Err(FeatureIndexError::DimensionMismatch { row: 1, expected: 3, found: 4 })
        ));

        assert!(matches!(
            FeatureIndex::from_parts(entries, vec![SparseVector::zeros(3)]),
            Err(FeatureIndexError::LengthMismatch { records: 2, vectors: 1 })
        ));
    }
}
