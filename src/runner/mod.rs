//! Loop execution: subprocess runner and the iteration controller.

pub mod loop_runner;
pub mod process;

pub use loop_runner::{LoopController, LoopOutcome, RunSummary};
pub use process::{IterationResult, IterationRunner, ProcessRunner, TranscriptLog};
