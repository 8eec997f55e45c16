//! Rank fusion of the content and collaborative rankings.
//!
//! The two engines score on unrelated scales (cosine similarity vs.
//! predicted rating), so only rank positions are fused. An item at
//! 0-indexed rank `r` in a list of length `L` gets the positional score
//! `L - r`; an item missing from a list gets 0 from it.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Weight given to each engine's positional scores.
///
/// Weights are applied as given: they are not renormalized and need not sum
/// to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub content: f32,
    pub collaborative: f32,
}

impl FusionWeights {
    pub fn new(content: f32, collaborative: f32) -> Self {
        Self {
            content,
            collaborative,
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// A title with its rank-derived score within one engine's list
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub title: String,
    pub score: f32,
}

/// A title with its fused score and the positional scores it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FusedScore {
    pub title: String,
    pub score: f32,
    pub content_score: f32,
    pub collaborative_score: f32,
}

/// Positional scores for a ranked list: `L` for the head down to 1 for the
/// tail.
pub fn positional_scores<S: AsRef<str>>(titles: &[S]) -> Vec<CandidateScore> {
    let len = titles.len();
    titles
        .iter()
        .enumerate()
        .map(|(rank, title)| CandidateScore {
            title: title.as_ref().to_string(),
            score: (len - rank) as f32,
        })
        .collect()
}

/// Merge two ranked title lists into one, best first.
///
/// Titles are joined by exact string. A title repeated within one list
/// keeps its first (highest) positional score. Equal fused scores are
/// ordered by title ascending, so the output is fully deterministic.
pub fn fuse<S: AsRef<str>>(
    content: &[S],
    collaborative: &[S],
    weights: FusionWeights,
    top_n: usize,
) -> Vec<FusedScore> {
    let content_scores = positional_scores(content);
    let collaborative_scores = positional_scores(collaborative);

    let mut merged: HashMap<&str, (f32, f32)> = HashMap::new();
    for candidate in &content_scores {
        merged
            .entry(candidate.title.as_str())
            .or_insert((candidate.score, 0.0));
    }
    let mut seen = HashSet::new();
    for candidate in &collaborative_scores {
        if seen.insert(candidate.title.as_str()) {
            merged.entry(candidate.title.as_str()).or_insert((0.0, 0.0)).1 = candidate.score;
        }
    }

    let mut fused: Vec<FusedScore> = merged
        .into_iter()
        .map(|(title, (content_score, collaborative_score))| FusedScore {
            title: title.to_string(),
            score: weights.content * content_score + weights.collaborative * collaborative_score,
            content_score,
            collaborative_score,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    fused.truncate(top_n);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(fused: &[FusedScore]) -> Vec<&str> {
        fused.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_positional_scores() {
        let scores = positional_scores(&["x", "y", "z"]);
        let values: Vec<_> = scores.iter().map(|c| c.score).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
        assert!(positional_scores::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_opposite_rankings() {
        let fused = fuse(&["B", "C"], &["C", "B"], FusionWeights::new(0.6, 0.4), 2);
        assert_eq!(titles(&fused), vec!["B", "C"]);
        assert!((fused[0].score - 1.6).abs() < 1e-6);
        assert!((fused[1].score - 1.4).abs() < 1e-6);
        assert_eq!(fused[0].content_score, 2.0);
        assert_eq!(fused[0].collaborative_score, 1.0);
    }

    #[test]
    fn test_missing_from_one_list_scores_zero() {
        let fused = fuse(&["A", "B"], &["C"], FusionWeights::default(), 10);
        // A: 0.5*2 = 1.0, B: 0.5*1 = 0.5, C: 0.5*1 = 0.5 (tie, title order)
        assert_eq!(titles(&fused), vec!["A", "B", "C"]);
        let c = &fused[2];
        assert_eq!(c.content_score, 0.0);
        assert_eq!(c.collaborative_score, 1.0);
    }

    #[test]
    fn test_ties_break_by_title() {
        let fused = fuse(&["Zulu", "Alpha"], &["Alpha", "Zulu"], FusionWeights::default(), 10);
        assert_eq!(titles(&fused), vec!["Alpha", "Zulu"]);
        assert_eq!(fused[0].score, fused[1].score);
    }

    #[test]
    fn test_weights_are_not_renormalized() {
        let fused = fuse(&["A"], &["A"], FusionWeights::new(1.0, 1.0), 10);
        assert_eq!(fused[0].score, 2.0);

        let fused = fuse(&["A"], &["A"], FusionWeights::new(0.0, 0.0), 10);
        assert_eq!(fused[0].score, 0.0);
    }

    #[test]
    fn test_repeated_title_keeps_first_rank() {
        let fused = fuse(&["A", "B", "A"], &["B", "B"], FusionWeights::new(1.0, 1.0), 10);
        let score_of = |title: &str| fused.iter().find(|f| f.title == title).unwrap().clone();

        assert_eq!(fused.len(), 2);
        assert_eq!(score_of("A").content_score, 3.0);
        assert_eq!(score_of("B").content_score, 2.0);
        assert_eq!(score_of("B").collaborative_score, 2.0);
        assert_eq!(titles(&fused), vec!["B", "A"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let fused = fuse(&["A", "B", "C"], &["D", "E"], FusionWeights::default(), 2);
        assert_eq!(fused.len(), 2);
        assert!(fuse(&["A"], &["B"], FusionWeights::default(), 0).is_empty());
    }

    #[test]
    fn test_pure_content_weight_keeps_content_order() {
        let content = ["A", "B", "C", "D"];
        let collaborative = ["D", "C", "E", "B"];
        let fused = fuse(&content, &collaborative, FusionWeights::new(1.0, 0.0), 10);
        assert_eq!(&titles(&fused)[..4], &["A", "B", "C", "D"]);

        let fused = fuse(&content, &collaborative, FusionWeights::new(0.0, 1.0), 10);
        assert_eq!(&titles(&fused)[..4], &["D", "C", "E", "B"]);
    }
}
