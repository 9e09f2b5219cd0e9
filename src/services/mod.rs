// Service exports
pub mod judge;
pub mod oracle;
pub mod scoring;
pub mod store;
pub mod usage;

pub use judge::{grade_for, QualityJudge};
pub use oracle::{AnthropicClient, Oracle, OracleError, OracleReply};
pub use scoring::{sample_pool, BatchScorer, BATCH_SIZE, SAMPLING_CAP};
pub use store::{FileStore, StoreError};
pub use usage::{CostEstimate, Usage, UsageTracker};
