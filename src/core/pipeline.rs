use crate::core::compiler::compile;
use crate::core::filters::admits;
use crate::core::ranking::{rank, TOP_N};
use crate::models::{AnswerSet, Candidate, Judgment, MatchReport, RankedMatch};
use crate::services::judge::QualityJudge;
use crate::services::scoring::{sample_pool, BatchScorer};
use crate::services::usage::UsageTracker;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// End-to-end matching run: compile answers, hard-filter the pool, score the
/// survivors in batches, rank, then judge the final top-N.
pub struct MatchPipeline {
    scorer: BatchScorer,
    judge: QualityJudge,
    usage: Arc<UsageTracker>,
    runs_judged: AtomicU64,
}

impl MatchPipeline {
    pub fn new(scorer: BatchScorer, judge: QualityJudge, usage: Arc<UsageTracker>) -> Self {
        Self {
            scorer,
            judge,
            usage,
            runs_judged: AtomicU64::new(0),
        }
    }

    /// Runs for which the judge oracle was actually called. Empty-pool runs
    /// short-circuit before the judge and do not count.
    pub fn runs_judged(&self) -> u64 {
        self.runs_judged.load(Ordering::Relaxed)
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub async fn run(&self, answers: &AnswerSet, pool: Vec<Candidate>) -> MatchReport {
        let total_candidates = pool.len();
        let (filters, criteria) = compile(answers);
        tracing::debug!(?filters, "Compiled hard filters");

        let mut admitted: Vec<Candidate> = pool;
        admitted.retain(|c| admits(c, &filters));
        let admitted_count = admitted.len();
        tracing::info!(
            total = total_candidates,
            admitted = admitted_count,
            "Hard filters applied"
        );

        if admitted.is_empty() {
            tracing::warn!("No candidate passed the hard filters");
            return MatchReport {
                filters,
                criteria,
                total_candidates,
                admitted: 0,
                scored: 0,
                matches: Vec::new(),
                judgment: Judgment::empty_pool(),
            };
        }

        let sampled = sample_pool(admitted);
        let scored_count = sampled.len();

        let results = self.scorer.score(&criteria, &sampled).await;
        let ranked = rank(results, TOP_N);

        let mut by_id: HashMap<String, Candidate> = sampled
            .into_iter()
            .map(|c| (c.listing.id.clone(), c))
            .collect();
        let matches: Vec<RankedMatch> = ranked
            .into_iter()
            .filter_map(|result| {
                by_id.remove(&result.listing_id).map(|candidate| RankedMatch {
                    candidate,
                    result,
                })
            })
            .collect();

        self.runs_judged.fetch_add(1, Ordering::Relaxed);
        let judgment = self.judge.judge(answers, &matches).await;
        tracing::info!(
            grade = %judgment.overall_grade,
            score = judgment.overall_score,
            matches = matches.len(),
            "Run complete"
        );

        MatchReport {
            filters,
            criteria,
            total_candidates,
            admitted: admitted_count,
            scored: scored_count,
            matches,
            judgment,
        }
    }
}
