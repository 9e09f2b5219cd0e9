//! Habitat Algo - Preference matching pipeline for communal housing listings
//!
//! This library compiles questionnaire answers into hard filters and a
//! criteria summary, admits listings through the filters, scores the
//! survivors in batches against a language-model oracle, ranks the results,
//! and grades the run's output with a second, richer-tier oracle pass.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{admits, compile, rank, MatchPipeline, TOP_N};
pub use models::{
    AnswerSet, AnswerValue, Candidate, CriteriaSummary, HardFilters, Judgment, Listing,
    MatchReport, RankedMatch, ScoreResult,
};
pub use services::{
    AnthropicClient, BatchScorer, FileStore, Oracle, QualityJudge, UsageTracker,
};
