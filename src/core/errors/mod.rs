//! Error handling for the pipeline.

mod types;

pub use types::{PipelineError, PipelineResult};
