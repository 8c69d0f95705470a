//! Similarity Ranker
//!
//! Cosine-similarity scoring and deterministic top-k ordering. Used as
//! the fallback scorer when a document store has no native index, and
//! to re-sort native results to the ordering contract.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};

/// A ranked hit; derived per query, never persisted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Id of the matched record
    pub record_id: String,

    /// Cosine similarity to the query, in [-1, 1]
    pub score: f32,

    /// Position in the result set (1 = most relevant)
    pub rank: usize,
}

/// Cosine similarity between two vectors of equal dimensionality.
///
/// A zero-norm operand scores 0.0 rather than NaN, keeping the ordering
/// well-defined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(RetrievalError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a * norm_b))
}

/// Score all candidates against the query and return the top `k`.
///
/// Ordering contract: descending score, ties broken by ascending id.
/// `k` is clamped to the candidate count. Fails with
/// `DimensionMismatch` if any candidate's length differs from the
/// query's.
pub fn rank(
    query: &[f32],
    candidates: &[(String, Vec<f32>)],
    k: usize,
) -> Result<Vec<ScoredResult>> {
    let mut results = Vec::with_capacity(candidates.len());
    for (id, vector) in candidates {
        let score = cosine_similarity(query, vector)?;
        results.push(ScoredResult {
            record_id: id.clone(),
            score,
            rank: 0,
        });
    }

    enforce_ordering(&mut results, k);
    Ok(results)
}

/// Sort to the ordering contract, truncate to `k`, and assign 1-based
/// ranks. Also applied to native backend output, which may not
/// guarantee the tie-break.
pub fn enforce_ordering(results: &mut Vec<ScoredResult>, k: usize) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
    results.truncate(k);
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(entries: &[(&str, &[f32])]) -> Vec<(String, Vec<f32>)> {
        entries
            .iter()
            .map(|(id, v)| ((*id).to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_scores_non_increasing() {
        let candidates = candidates(&[
            ("far", &[0.0, 1.0]),
            ("near", &[1.0, 0.1]),
            ("mid", &[1.0, 1.0]),
        ]);

        let results = rank(&[1.0, 0.0], &candidates, 3).unwrap();
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(results[0].record_id, "near");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].record_id, "far");
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        // Parallel vectors score identically
        let candidates = candidates(&[
            ("delta", &[2.0, 0.0]),
            ("alpha", &[1.0, 0.0]),
            ("bravo", &[3.0, 0.0]),
        ]);

        let results = rank(&[1.0, 0.0], &candidates, 3).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "bravo", "delta"]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let candidates = candidates(&[("bad", &[1.0, 0.0, 0.0, 0.0])]);
        let err = rank(&[1.0, 0.0, 0.0], &candidates, 1).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[test]
    fn test_zero_query_scores_all_zero() {
        let candidates = candidates(&[("b", &[1.0, 2.0]), ("a", &[3.0, 4.0])]);

        let results = rank(&[0.0, 0.0], &candidates, 2).unwrap();
        assert!(results.iter().all(|r| r.score == 0.0));
        let ids: Vec<&str> = results.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_zero_candidate_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_k_clamped_to_candidate_count() {
        let candidates = candidates(&[("only", &[1.0])]);
        let results = rank(&[1.0], &candidates, 10).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_enforce_ordering_reassigns_ranks() {
        let mut results = vec![
            ScoredResult {
                record_id: "low".into(),
                score: 0.1,
                rank: 1,
            },
            ScoredResult {
                record_id: "high".into(),
                score: 0.9,
                rank: 2,
            },
        ];

        enforce_ordering(&mut results, 2);
        assert_eq!(results[0].record_id, "high");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }
}
