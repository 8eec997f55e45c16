//! Sparse weighted-term vectors.

use crate::feature_index::FeatureIndexError;

/// A sparse vector over a fixed vocabulary.
///
/// Entries are sorted by term id with no duplicates and no zero weights.
/// The L2 norm is computed once at construction; vectors are never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(u32, f32)>,
    norm: f32,
}

impl SparseVector {
    /// Build a vector from (term, weight) pairs in any order.
    ///
    /// Repeated terms are summed. Fails if a term id falls outside `dim`.
    pub fn new(
        dim: usize,
        entries: impl IntoIterator<Item = (u32, f32)>,
    ) -> Result<Self, FeatureIndexError> {
        let mut entries: Vec<(u32, f32)> = entries.into_iter().collect();
        if let Some(&(term, _)) = entries.iter().find(|(term, _)| *term as usize >= dim) {
            return Err(FeatureIndexError::TermOutOfRange { term, dim });
        }

        entries.sort_unstable_by_key(|&(term, _)| term);
        let mut merged: Vec<(u32, f32)> = Vec::with_capacity(entries.len());
        for (term, weight) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == term => last.1 += weight,
                _ => merged.push((term, weight)),
            }
        }
        merged.retain(|&(_, weight)| weight != 0.0);

        let norm = merged.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        Ok(Self {
            dim,
            entries: merged,
            norm,
        })
    }

    /// An all-zero vector
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
            norm: 0.0,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn norm(&self) -> f32 {
        self.norm
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    /// Scale to unit length; the zero vector stays zero
    pub fn normalized(mut self) -> Self {
        if self.norm > 0.0 {
            let norm = self.norm;
            for (_, weight) in &mut self.entries {
                *weight /= norm;
            }
            self.norm = 1.0;
        }
        self
    }

    /// Dot product by merging the two sorted entry lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_term, a_weight) = self.entries[i];
            let (b_term, b_weight) = other.entries[j];
            match a_term.cmp(&b_term) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; 0 when either vector has zero magnitude
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        self.dot(other) / (self.norm * other.norm)
    }
}
