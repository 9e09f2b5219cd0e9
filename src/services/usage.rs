use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// Per-million-token prices for the two model tiers.
const SCORING_INPUT_PER_MTOK: f64 = 0.80;
const SCORING_OUTPUT_PER_MTOK: f64 = 4.00;
const JUDGE_INPUT_PER_MTOK: f64 = 3.00;
const JUDGE_OUTPUT_PER_MTOK: f64 = 15.00;

// Assumed judge-call footprint per judged run, used to split the untagged
// grand total between tiers.
const JUDGE_INPUT_PER_RUN: u64 = 3000;
const JUDGE_OUTPUT_PER_RUN: u64 = 800;

/// Process-wide accumulator of oracle token usage.
///
/// Shared between the scoring client and the judge via `Arc`; increments are
/// atomic so bounded batch parallelism stays safe.
#[derive(Debug, Default)]
pub struct UsageTracker {
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

/// Point-in-time snapshot of the accumulated totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Estimated cost split between the two model tiers.
///
/// The accumulator does not tag which call used which tier, so the judge
/// share is inferred from a fixed per-run assumption and subtracted from the
/// grand total. This is an approximation, not an exact accounting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub scoring_input_tokens: u64,
    pub scoring_output_tokens: u64,
    pub judge_input_tokens: u64,
    pub judge_output_tokens: u64,
    pub scoring_cost_usd: f64,
    pub judge_cost_usd: f64,
    pub total_cost_usd: f64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate the token counts reported by one oracle call.
    pub fn record(&self, input_tokens: u64, output_tokens: u64) {
        self.input_tokens.fetch_add(input_tokens, Ordering::Relaxed);
        self.output_tokens.fetch_add(output_tokens, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Usage {
        Usage {
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
        }
    }

    /// Estimate per-tier cost given how many runs reached the judge.
    pub fn estimate(&self, runs_judged: u64) -> CostEstimate {
        let totals = self.snapshot();

        let judge_input = (JUDGE_INPUT_PER_RUN * runs_judged).min(totals.input_tokens);
        let judge_output = (JUDGE_OUTPUT_PER_RUN * runs_judged).min(totals.output_tokens);
        let scoring_input = totals.input_tokens - judge_input;
        let scoring_output = totals.output_tokens - judge_output;

        let scoring_cost = (scoring_input as f64 / 1_000_000.0) * SCORING_INPUT_PER_MTOK
            + (scoring_output as f64 / 1_000_000.0) * SCORING_OUTPUT_PER_MTOK;
        let judge_cost = (judge_input as f64 / 1_000_000.0) * JUDGE_INPUT_PER_MTOK
            + (judge_output as f64 / 1_000_000.0) * JUDGE_OUTPUT_PER_MTOK;

        CostEstimate {
            scoring_input_tokens: scoring_input,
            scoring_output_tokens: scoring_output,
            judge_input_tokens: judge_input,
            judge_output_tokens: judge_output,
            scoring_cost_usd: scoring_cost,
            judge_cost_usd: judge_cost,
            total_cost_usd: scoring_cost + judge_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let tracker = UsageTracker::new();
        tracker.record(1000, 200);
        tracker.record(500, 100);
        let usage = tracker.snapshot();
        assert_eq!(usage.input_tokens, 1500);
        assert_eq!(usage.output_tokens, 300);
    }

    #[test]
    fn test_estimate_splits_judge_share() {
        let tracker = UsageTracker::new();
        // 10_000 in / 2_000 out total, one judged run
        tracker.record(10_000, 2_000);
        let estimate = tracker.estimate(1);

        assert_eq!(estimate.judge_input_tokens, 3000);
        assert_eq!(estimate.judge_output_tokens, 800);
        assert_eq!(estimate.scoring_input_tokens, 7000);
        assert_eq!(estimate.scoring_output_tokens, 1200);

        let expected_judge = 3000.0 / 1e6 * 3.0 + 800.0 / 1e6 * 15.0;
        let expected_scoring = 7000.0 / 1e6 * 0.80 + 1200.0 / 1e6 * 4.0;
        assert!((estimate.judge_cost_usd - expected_judge).abs() < 1e-9);
        assert!((estimate.scoring_cost_usd - expected_scoring).abs() < 1e-9);
        assert!(
            (estimate.total_cost_usd - (expected_judge + expected_scoring)).abs() < 1e-9
        );
    }

    #[test]
    fn test_estimate_clamps_to_recorded_totals() {
        let tracker = UsageTracker::new();
        // Less usage than the per-run assumption: the judge share cannot
        // exceed what was actually recorded.
        tracker.record(1000, 100);
        let estimate = tracker.estimate(1);
        assert_eq!(estimate.judge_input_tokens, 1000);
        assert_eq!(estimate.judge_output_tokens, 100);
        assert_eq!(estimate.scoring_input_tokens, 0);
        assert_eq!(estimate.scoring_output_tokens, 0);
    }

    #[test]
    fn test_estimate_zero_runs() {
        let tracker = UsageTracker::new();
        tracker.record(5000, 1000);
        let estimate = tracker.estimate(0);
        assert_eq!(estimate.judge_input_tokens, 0);
        assert_eq!(estimate.scoring_input_tokens, 5000);
    }
}
