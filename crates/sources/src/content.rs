//! Content Similarity Engine
//!
//! "Movies whose metadata reads like this one."
//!
//! ## Algorithm
//! 1. Resolve the title to a feature-index row (case-insensitive)
//! 2. Cosine similarity between that row's vector and every row
//! 3. Stable sort by descending similarity (ties keep row order)
//! 4. Drop the query row itself, truncate to the limit
//!
//! Cost is O(N·nnz) per request; nothing is cached between requests.

use crate::feature_index::FeatureIndex;
use crate::types::SimilarMovie;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ranks catalog movies by metadata similarity to a query movie
#[derive(Debug, Clone)]
pub struct ContentSimilarityEngine {
    /// Shared, read-only feature index
    index: Arc<FeatureIndex>,
}

impl ContentSimilarityEngine {
    pub fn new(index: Arc<FeatureIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    /// Whether the title resolves to a row of the feature index
    pub fn knows_title(&self, title: &str) -> bool {
        self.index.lookup(title).is_some()
    }

    /// Movies most similar to `title`, most similar first.
    ///
    /// Returns an empty list when the title is unknown; callers that need
    /// to tell "unknown" from "no neighbours" check [`Self::knows_title`].
    #[instrument(skip(self))]
    pub fn similar_items(&self, title: &str, limit: usize) -> Vec<SimilarMovie> {
        let Some(query_row) = self.index.lookup(title) else {
            debug!("Title not found in feature index");
            return Vec::new();
        };

        let ranked = self.rank_rows(query_row);
        let similar: Vec<SimilarMovie> = ranked
            .into_iter()
            .filter(|&(row, _)| row != query_row)
            .take(limit)
            .filter_map(|(row, similarity)| {
                let record = self.index.record(row)?;
                Some(SimilarMovie {
                    row,
                    movie_id: record.id,
                    title: record.title.clone(),
                    similarity,
                })
            })
            .collect();

        debug!("Found {} similar movies", similar.len());
        similar
    }

    /// Titles of [`Self::similar_items`], in the same order
    pub fn similar_titles(&self, title: &str, limit: usize) -> Vec<String> {
        self.similar_items(title, limit)
            .into_iter()
            .map(|movie| movie.title)
            .collect()
    }

    /// Every row paired with its similarity to `query_row`, sorted by
    /// descending similarity. The query row itself is included.
    fn rank_rows(&self, query_row: usize) -> Vec<(usize, f32)> {
        let Some(query) = self.index.vector(query_row) else {
            return Vec::new();
        };

        // collect() on an indexed parallel iterator keeps row order,
        // which the stable sort below relies on for tie-breaking
        let mut scores: Vec<(usize, f32)> = self
            .index
            .vectors()
            .par_iter()
            .enumerate()
            .map(|(row, vector)| (row, query.cosine(vector)))
            .collect();

        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::SparseVector;
    use data_loader::CatalogEntry;

    fn entry(id: u32, title: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.to_string(),
            year: None,
            genres: vec!["Drama".to_string()],
            director: "Someone".to_string(),
        }
    }

    fn vector(entries: &[(u32, f32)]) -> SparseVector {
        SparseVector::new(4, entries.iter().copied()).unwrap()
    }

    /// A and B share a vector, C is orthogonal to both
    fn abc_engine() -> ContentSimilarityEngine {
        let index = FeatureIndex::from_parts(
            vec![entry(1, "A"), entry(2, "B"), entry(3, "C")],
            vec![
                vector(&[(0, 1.0), (1, 1.0)]),
                vector(&[(0, 1.0), (1, 1.0)]),
                vector(&[(2, 1.0)]),
            ],
        )
        .unwrap();
        ContentSimilarityEngine::new(Arc::new(index))
    }

    /// Several rows with graded and tied similarities to row 0
    fn graded_engine() -> ContentSimilarityEngine {
        let index = FeatureIndex::from_parts(
            vec![
                entry(1, "Query"),
                entry(2, "Far"),
                entry(3, "Tie One"),
                entry(4, "Near"),
                entry(5, "Tie Two"),
                entry(6, "Empty"),
            ],
            vec![
                vector(&[(0, 1.0), (1, 1.0)]),
                vector(&[(1, 0.1), (3, 1.0)]),
                vector(&[(0, 1.0), (2, 1.0)]),
                vector(&[(0, 1.0), (1, 0.9)]),
                vector(&[(0, 1.0), (2, 1.0)]),
                SparseVector::zeros(4),
            ],
        )
        .unwrap();
        ContentSimilarityEngine::new(Arc::new(index))
    }

    #[test]
    fn test_identical_then_orthogonal() {
        let engine = abc_engine();
        let results = engine.similar_items("A", 2);

        let titles: Vec<_> = results.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert!((results[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(results[1].similarity, 0.0);
    }

    #[test]
    fn test_query_never_in_own_results() {
        let engine = abc_engine();
        // B ties with A at similarity 1.0 and sits after it; A must still be
        // returned and B excluded
        let titles = engine.similar_titles("b", 10);
        assert_eq!(titles, vec!["A", "C"]);

        for title in ["Query", "Far", "Near", "Tie One", "Empty"] {
            let results = graded_engine().similar_titles(title, 10);
            assert!(!results.iter().any(|t| t == title));
            assert_eq!(results.len(), 5);
        }
    }

    #[test]
    fn test_ordering_and_stable_ties() {
        let engine = graded_engine();
        let titles = engine.similar_titles("Query", 10);
        // Near (0.999) > Tie One == Tie Two (0.5, row order kept) > Far > Empty
        assert_eq!(titles, vec!["Near", "Tie One", "Tie Two", "Far", "Empty"]);
    }

    #[test]
    fn test_deterministic() {
        let engine = graded_engine();
        assert_eq!(engine.similar_items("Query", 4), engine.similar_items("Query", 4));
    }

    #[test]
    fn test_truncation_is_prefix() {
        let engine = graded_engine();
        for n in 0..6 {
            let shorter = engine.similar_titles("Query", n);
            let longer = engine.similar_titles("Query", n + 1);
            assert_eq!(shorter.len(), n.min(5));
            assert_eq!(&longer[..shorter.len()], shorter.as_slice());
        }
    }

    #[test]
    fn test_unknown_title_is_empty() {
        let engine = abc_engine();
        assert!(engine.similar_items("Nonexistent Movie Title", 5).is_empty());
        assert!(!engine.knows_title("Nonexistent Movie Title"));
        assert!(engine.knows_title("  a "));
    }
}
