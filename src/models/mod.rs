// Model exports
pub mod answers;
pub mod domain;

pub use answers::{AnswerSet, AnswerValue};
pub use domain::{
    Candidate, CriteriaSummary, Evaluation, HardFilters, Judgment, Listing, ListingTags,
    MatchReport, RankedMatch, ScoreResult,
};
