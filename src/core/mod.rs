// Core pipeline exports
pub mod compiler;
pub mod filters;
pub mod pipeline;
pub mod ranking;

pub use compiler::compile;
pub use filters::admits;
pub use pipeline::MatchPipeline;
pub use ranking::{rank, TOP_N};
