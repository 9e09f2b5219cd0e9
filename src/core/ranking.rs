use crate::models::ScoreResult;
use std::cmp::Ordering;

/// Number of ranked results kept for the judge and the final report.
pub const TOP_N: usize = 20;

/// Merge-sort all score results descending and keep the top `top_n`.
///
/// The sort is stable, so ties resolve to first-seen input order. Fallback
/// zeros from failed batches stay in the total order: a batch failure
/// degrades those listings' rank but never removes them from consideration.
pub fn rank(mut results: Vec<ScoreResult>, top_n: usize) -> Vec<ScoreResult> {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(top_n);
    results
}
