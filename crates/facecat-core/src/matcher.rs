//! Nearest-neighbour matching of a query embedding against the catalog.

use crate::types::{Embedding, KnownFace, MatchResult};

/// Maximum Euclidean distance accepted as the same person.
///
/// ArcFace embeddings are L2-normalized, so a distance of 1.0 corresponds to
/// a cosine similarity of 0.5.
pub const MATCH_TOLERANCE: f32 = 1.0;

/// Strategy for comparing a query embedding against a gallery of known faces.
pub trait Matcher {
    fn compare(&self, query: &Embedding, gallery: &[KnownFace]) -> MatchResult;
}

/// Distance from `query` to every gallery entry, in gallery order.
pub fn face_distances(query: &Embedding, gallery: &[KnownFace]) -> Vec<f32> {
    gallery
        .iter()
        .map(|known| query.euclidean_distance(&known.embedding))
        .collect()
}

/// Euclidean argmin matcher with a single global tolerance.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanMatcher {
    tolerance: f32,
}

impl EuclideanMatcher {
    pub(crate) fn with_tolerance(tolerance: f32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self::with_tolerance(MATCH_TOLERANCE)
    }
}

impl Matcher for EuclideanMatcher {
    fn compare(&self, query: &Embedding, gallery: &[KnownFace]) -> MatchResult {
        if gallery.is_empty() {
            return MatchResult::unknown();
        }

        let distances = face_distances(query, gallery);

        // Strict `<` keeps the first of equal minima.
        let mut best_idx = 0;
        for (i, &d) in distances.iter().enumerate().skip(1) {
            if d < distances[best_idx] {
                best_idx = i;
            }
        }
        let best = distances[best_idx];

        tracing::trace!(best_idx, distance = best, tolerance = self.tolerance, "nearest face");

        MatchResult {
            name: (best <= self.tolerance).then(|| gallery[best_idx].name.clone()),
            distance: Some(best),
            index: Some(best_idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(name: &str, values: Vec<f32>) -> KnownFace {
        KnownFace {
            id: 0,
            name: name.into(),
            embedding: Embedding::new(values),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_empty_gallery_is_unknown() {
        let query = Embedding::new(vec![1.0, 0.0]);
        let result = EuclideanMatcher::default().compare(&query, &[]);
        assert!(!result.is_match());
        assert_eq!(result.distance, None);
        assert_eq!(result.index, None);
        assert_eq!(result.label(), "Unknown");
    }

    #[test]
    fn test_identical_embedding_matches() {
        let gallery = vec![
            known("alice", vec![0.6, 0.8, 0.0]),
            known("bob", vec![0.0, 0.0, 1.0]),
        ];
        let query = gallery[1].embedding.clone();
        let result = EuclideanMatcher::default().compare(&query, &gallery);
        assert_eq!(result.name.as_deref(), Some("bob"));
        assert_eq!(result.distance, Some(0.0));
        assert_eq!(result.index, Some(1));
    }

    #[test]
    fn test_nearest_beyond_tolerance_is_unknown() {
        let gallery = vec![known("alice", vec![1.0, 0.0])];
        let query = Embedding::new(vec![-1.0, 0.0]);
        let result = EuclideanMatcher::default().compare(&query, &gallery);
        assert!(!result.is_match());
        assert_eq!(result.index, Some(0));
        assert!((result.distance.unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tie_goes_to_first_occurrence() {
        let gallery = vec![
            known("first", vec![1.0, 0.0]),
            known("second", vec![1.0, 0.0]),
        ];
        let query = Embedding::new(vec![0.9, 0.1]);
        let result = EuclideanMatcher::default().compare(&query, &gallery);
        assert_eq!(result.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_picks_minimum_not_first_within_tolerance() {
        let gallery = vec![
            known("near", vec![0.8, 0.6]),
            known("nearest", vec![1.0, 0.0]),
        ];
        let query = Embedding::new(vec![1.0, 0.0]);
        let result = EuclideanMatcher::default().compare(&query, &gallery);
        assert_eq!(result.name.as_deref(), Some("nearest"));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let matcher = EuclideanMatcher::with_tolerance(0.5);
        let gallery = vec![known("edge", vec![0.5])];
        let result = matcher.compare(&Embedding::new(vec![0.0]), &gallery);
        assert!(result.is_match());
    }

    #[test]
    fn test_face_distances_order() {
        let gallery = vec![known("a", vec![0.0, 1.0]), known("b", vec![3.0, 4.0])];
        let d = face_distances(&Embedding::new(vec![0.0, 0.0]), &gallery);
        assert_eq!(d.len(), 2);
        assert!((d[0] - 1.0).abs() < 1e-6);
        assert!((d[1] - 5.0).abs() < 1e-6);
    }
}
