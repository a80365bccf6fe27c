//! Loop controller - orchestrates iterations until a terminal state.
//!
//! One logical sequence: assemble prompt, run the agent, detect completion,
//! persist notes, delay, repeat. Terminal states are mutually exclusive:
//! `Completed` (marker seen), `Exhausted` (iteration cap), `Interrupted`
//! (cancellation token observed). Everything an iteration can fail with is
//! recovered here: a transient error is warned about and the loop moves on
//! to the delay and the next iteration.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::console;
use crate::detect;
use crate::error::Result;
use crate::notes::{self, NotesEntry};
use crate::prompt;
use crate::runner::process::{IterationRunner, TranscriptLog};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// A completion marker was detected
    Completed,

    /// The iteration cap was reached without completion
    Exhausted,

    /// The cancellation token fired; no further iteration was started
    Interrupted,
}

/// Summary of the whole run, returned to main.
#[derive(Debug)]
pub struct RunSummary {
    /// Subprocess iterations performed (dry-run iterations included)
    pub iterations: u32,

    /// Terminal state
    pub outcome: LoopOutcome,
}

/// Drives the supervised retry loop over an [`IterationRunner`].
pub struct LoopController<R: IterationRunner> {
    config: RunConfig,
    runner: R,
    cancel: CancellationToken,
}

impl<R: IterationRunner> LoopController<R> {
    pub fn new(config: RunConfig, runner: R, cancel: CancellationToken) -> Self {
        Self {
            config,
            runner,
            cancel,
        }
    }

    /// The runner behind this controller (used by scenario tests).
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run iterations until a terminal state is reached.
    ///
    /// The cancellation token is observed before each iteration and during
    /// the inter-iteration delay; an iteration already in flight is allowed
    /// to finish.
    pub async fn run(&self) -> RunSummary {
        let mut log = match &self.config.log_file {
            Some(path) => match TranscriptLog::open(path) {
                Ok(log) => Some(log),
                Err(e) => {
                    console::error(&format!("Failed to open log file: {}", e));
                    None
                }
            },
            None => None,
        };

        let mut iteration = 0u32;

        let outcome = loop {
            if self.cancel.is_cancelled() {
                break LoopOutcome::Interrupted;
            }

            if self.config.max_iterations > 0 && iteration >= self.config.max_iterations {
                console::warn(&format!(
                    "Max iterations ({}) reached",
                    self.config.max_iterations
                ));
                break LoopOutcome::Exhausted;
            }

            iteration += 1;
            console::iteration_banner(iteration, self.config.max_iterations);

            if let Some(log) = log.as_mut()
                && let Err(e) = log.iteration_start(iteration)
            {
                log::warn!("failed to write iteration header: {}", e);
            }

            match self.run_step(iteration, log.as_mut()).await {
                Ok(true) => {
                    console::ok(&format!(
                        "Loop completed successfully after {} iteration(s)!",
                        iteration
                    ));
                    break LoopOutcome::Completed;
                }
                Ok(false) => {}
                Err(e) => {
                    // Transient: spawn/pipe/prompt-read failures never kill a
                    // long-running supervised session.
                    console::warn(&format!("Iteration {} failed: {}", iteration, e));
                }
            }

            if self.config.delay_secs > 0 {
                console::info(&format!(
                    "Waiting {}s before next iteration...",
                    self.config.delay_secs
                ));
                tokio::select! {
                    _ = self.cancel.cancelled() => break LoopOutcome::Interrupted,
                    _ = tokio::time::sleep(Duration::from_secs(self.config.delay_secs)) => {}
                }
            }
        };

        println!();
        console::info(&format!(
            "Ralph loop finished. Total iterations: {}",
            iteration
        ));

        RunSummary {
            iterations: iteration,
            outcome,
        }
    }

    /// One `Running` step: prompt, subprocess, completion check, notes.
    ///
    /// Returns Ok(true) when a completion marker was detected.
    async fn run_step(&self, iteration: u32, mut log: Option<&mut TranscriptLog>) -> Result<bool> {
        console::iter(&format!("Iteration {} starting...", iteration));

        let prompt = prompt::assemble(&self.config)?;
        if self.config.verbose {
            console::prompt_preview(&prompt);
        }

        let mut result = self
            .runner
            .run_iteration(iteration, &prompt, &self.config, log.as_deref_mut())
            .await?;

        if let Some(log) = log.as_deref_mut()
            && let Err(e) = log.iteration_end(iteration)
        {
            log::warn!("failed to write iteration footer: {}", e);
        }

        // A deadline kill never counts as the agent claiming done.
        if !result.timed_out {
            result.completed = detect::is_complete(&result.transcript, &self.config.completion);
        }

        // Notes are harvested even from partial (timed-out) transcripts so
        // context is not lost; a failed append is a warning, not a stop.
        if let Some(body) = notes::extract_notes(&result.transcript) {
            let entry = NotesEntry::new(iteration, body);
            match notes::append(&entry, &self.config.notes_file) {
                Ok(()) => console::info("Notes captured for the next iteration"),
                Err(e) => console::warn(&e.to_string()),
            }
        }

        if result.completed {
            console::ok("Completion marker detected!");
        }

        Ok(result.completed)
    }
}
