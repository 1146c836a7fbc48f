//! Queue worker and per-job pipeline orchestration.

mod consumer;
mod pipeline;

pub use consumer::{PollOutcome, Worker};
pub use pipeline::{JobPipeline, PipelineError, RunOutcome};
